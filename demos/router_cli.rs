//! A small interactive demonstration of the multicast control plane:
//! wires a handful of static interfaces and unicast routes, then drives
//! `mcast`, `dvmrp init` and `dvmrp show` from stdin — the Rust-native
//! equivalent of the original implementation's operator CLI shell
//! (spec.md §6). `env_logger`/`getopts` are the teacher crate's own
//! example-binary dev-dependencies; see `DESIGN.md` for the honest
//! grounding note on this binary's `main()` shape.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use getopts::Options;

use mcast_router_core::cli::register_commands;
use mcast_router_core::config::Tunables;
use mcast_router_core::iface::CliRegistry;
use mcast_router_core::{IfaceId, Ipv4Address, RouteEntry, RouteTable, Router};

mod utils_support {
    use mcast_router_core::{IfaceId, Interface, InterfaceTable, Ipv4Address};

    pub struct StaticInterface {
        pub id: IfaceId,
        pub name: &'static str,
        pub address: Ipv4Address,
    }

    impl Interface for StaticInterface {
        fn id(&self) -> IfaceId {
            self.id
        }
        fn name(&self) -> &str {
            self.name
        }
        fn address(&self) -> Ipv4Address {
            self.address
        }
    }

    pub struct StaticInterfaceTable {
        pub ifaces: Vec<StaticInterface>,
    }

    pub struct Iter<'a> {
        inner: std::slice::Iter<'a, StaticInterface>,
    }

    impl<'a> Iterator for Iter<'a> {
        type Item = &'a dyn Interface;
        fn next(&mut self) -> Option<Self::Item> {
            self.inner.next().map(|i| i as &dyn Interface)
        }
    }

    impl InterfaceTable for StaticInterfaceTable {
        type Iter<'a> = Iter<'a> where Self: 'a;

        fn iter(&self) -> Self::Iter<'_> {
            Iter { inner: self.ifaces.iter() }
        }

        fn get(&self, id: IfaceId) -> Option<&dyn Interface> {
            self.ifaces.iter().find(|i| i.id == id).map(|i| i as &dyn Interface)
        }
    }
}

use utils_support::{StaticInterface, StaticInterfaceTable};

struct StaticRouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable for StaticRouteTable {
    fn entries(&self) -> &[RouteEntry] {
        &self.routes
    }
}

/// A `CliRegistry` that just stacks its registered handlers in a `Vec` and
/// dispatches by exact name match against the first whitespace-split
/// token of each stdin line.
#[derive(Default)]
struct StdinRegistry {
    commands: Vec<(String, Box<dyn FnMut(&[&str])>)>,
}

impl CliRegistry for StdinRegistry {
    fn register(&mut self, name: &str, handler: Box<dyn FnMut(&[&str])>) {
        self.commands.push((name.to_string(), handler));
    }
}

impl StdinRegistry {
    fn dispatch(&mut self, name: &str, args: &[&str]) -> bool {
        for (cmd_name, handler) in self.commands.iter_mut() {
            if cmd_name == name {
                handler(args);
                return true;
            }
        }
        false
    }
}

fn sample_ifaces() -> StaticInterfaceTable {
    StaticInterfaceTable {
        ifaces: vec![
            StaticInterface { id: IfaceId::new(0).unwrap(), name: "eth0", address: Ipv4Address::new(10, 0, 0, 1) },
            StaticInterface { id: IfaceId::new(1).unwrap(), name: "eth1", address: Ipv4Address::new(10, 0, 1, 1) },
        ],
    }
}

fn sample_routes() -> StaticRouteTable {
    StaticRouteTable {
        routes: vec![RouteEntry {
            network: Ipv4Address::new(10, 0, 1, 0),
            netmask: Ipv4Address::new(255, 255, 255, 0),
            nexthop: Ipv4Address::UNSPECIFIED,
            iface: IfaceId::new(1).unwrap(),
        }],
    }
}

fn main() {
    env_logger::init();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    let args: Vec<String> = std::env::args().collect();
    let matches = opts.parse(&args[1..]).expect("invalid arguments");
    if matches.opt_present("h") {
        print!("{}", opts.usage("Usage: router_cli [options]"));
        return;
    }

    let ifaces = Rc::new(sample_ifaces());
    let routes: Rc<dyn RouteTable> = Rc::new(sample_routes());
    let router = Rc::new(RefCell::new(Router::new(Tunables::default())));
    router.borrow_mut().mcast_init(routes.as_ref());

    let mut registry = StdinRegistry::default();
    register_commands(&mut registry, Rc::clone(&router), Rc::clone(&ifaces), Rc::clone(&routes));

    println!("commands: mcast | dvmrp init | dvmrp show | quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { continue };
        if command == "quit" || command == "exit" {
            break;
        }
        let rest: Vec<&str> = words.collect();
        if !registry.dispatch(command, &rest) {
            eprintln!("unknown command: {}", command);
        }
    }
}
