//! Create configuration for model Cisco-IOS-XR-ifmgr-cfg on a NETCONF
//! device.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rust_netconf::{
    CrudService, LeafValue, SchemaNode, SchemaRegistry, Session, SessionConfig, XmlCodec,
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

/// Add config data to the interface-configurations tree
fn config_interface_configurations(interface_configurations: &mut SchemaNode) {
    const MODULE: &str = "Cisco-IOS-XR-ifmgr-cfg";

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
    let codec = XmlCodec::new(Arc::new(registry));

    let session = Session::connect(&SessionConfig {
        address: args.host,
        port: args.port,
        username: args.username,
        password: args.password,
        ..Default::default()
    })?;

    let mut interface_configurations =
        SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configurations");
    config_interface_configurations(&mut interface_configurations);

    let crud = CrudService::new(codec);
    crud.create(&session, &interface_configurations)?;

    session.close()?;
    Ok(())
}
