//! Encode configuration for model Cisco-IOS-XR-ifmgr-cfg with the
//! standalone codec, without talking to a device.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rust_netconf::{LeafValue, SchemaNode, SchemaRegistry, XmlCodec};

#[derive(Parser)]
struct Args {
    /// print debugging messages
    #[arg(short, long)]
    verbose: bool,
    /// directory containing module definition files
    #[arg(long, default_value = "models")]
    models: PathBuf,
}

/// Add config data to the interface-configurations tree
fn config_interface_configurations(interface_configurations: &mut SchemaNode) {
    const MODULE: &str = "Cisco-IOS-XR-ifmgr-cfg";
    const IPV4_MODULE: &str = "Cisco-IOS-XR-ipv4-io-cfg";

    // configure IPv4 loopback
    let mut interface_configuration = SchemaNode::container(MODULE, "interface-configuration");
    interface_configuration.push_child(SchemaNode::leaf(MODULE, "active", "act"));
    interface_configuration.push_child(SchemaNode::leaf(MODULE, "interface-name", "Loopback0"));
    interface_configuration.push_child(SchemaNode::leaf(
        MODULE,
        "interface-virtual",
        LeafValue::Empty,
    ));
    interface_configuration.push_child(SchemaNode::leaf(
        MODULE,
        "description",
        "PRIMARY ROUTER LOOPBACK",
    ));

    let mut primary = SchemaNode::container(IPV4_MODULE, "primary");
    primary.push_child(SchemaNode::leaf(IPV4_MODULE, "address", "172.16.255.1"));
    primary.push_child(SchemaNode::leaf(IPV4_MODULE, "netmask", "255.255.255.255"));
    let mut addresses = SchemaNode::container(IPV4_MODULE, "addresses");
    addresses.push_child(primary);
    let mut ipv4_network = SchemaNode::container(IPV4_MODULE, "ipv4-network");
    ipv4_network.push_child(addresses);
    interface_configuration.push_child(ipv4_network);

    let mut list = SchemaNode::list(MODULE, "interface-configuration");
    list.push_child(interface_configuration);
    interface_configurations.push_child(list);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let mut registry = SchemaRegistry::new();
    registry.load_file(args.models.join("Cisco-IOS-XR-ifmgr-cfg.json"))?;
    registry.load_file(args.models.join("Cisco-IOS-XR-ipv4-io-cfg.json"))?;
    let codec = XmlCodec::new(Arc::new(registry));

    let mut interface_configurations =
        SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configurations");
    config_interface_configurations(&mut interface_configurations);

    println!("{}", codec.encode_pretty(&interface_configurations)?);
    Ok(())
}
