//! Execute RPC routing-mpls-tunnel-down from model
//! Cisco-IOS-XR-snmp-test-trap-act on a NETCONF device.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rust_netconf::{
    ExecutorService, QualifiedName, SchemaNode, SchemaRegistry, Session, SessionConfig, XmlCodec,
};

#[derive(Parser)]
struct Args {
    /// print debugging messages
    #[arg(short, long)]
    verbose: bool,
    /// directory containing module definition files
    #[arg(long, default_value = "models")]
    models: PathBuf,
    /// NETCONF device address
    #[arg(long)]
    host: String,
    #[arg(long, default_value_t = 830)]
    port: u16,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

/// Add RPC input data for routing-mpls-tunnel-down
fn prepare_routing_mpls_tunnel_down_input() -> SchemaNode {
    const MODULE: &str = "Cisco-IOS-XR-snmp-test-trap-act";

    let mut input = SchemaNode::container(MODULE, "input");
    input.push_child(SchemaNode::leaf(MODULE, "destination", "172.16.255.2"));
    input.push_child(SchemaNode::leaf(MODULE, "index", 1u64));
    input.push_child(SchemaNode::leaf(MODULE, "instance", 0u64));
    input.push_child(SchemaNode::leaf(MODULE, "source", "172.16.255.1"));
    input
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let mut registry = SchemaRegistry::new();
    registry.load_file(args.models.join("Cisco-IOS-XR-snmp-test-trap-act.json"))?;
    let codec = XmlCodec::new(Arc::new(registry));

    let session = Session::connect(&SessionConfig {
        address: args.host,
        port: args.port,
        username: args.username,
        password: args.password,
        ..Default::default()
    })?;

    let executor = ExecutorService::new(codec);
    let rpc = QualifiedName::new("Cisco-IOS-XR-snmp-test-trap-act", "routing-mpls-tunnel-down");
    let input = prepare_routing_mpls_tunnel_down_input();
    let output = executor.execute_rpc(&session, &rpc, Some(&input))?;
    if output.is_some() {
        println!("rpc returned output");
    }

    session.close()?;
    Ok(())
}
