use httpmock::prelude::*;
use httpmock::Method::PATCH;
use ipam_reconcile::adapters::prompt::ScriptedPrompter;
use ipam_reconcile::app::{DeviceCheck, PortCheck};
use ipam_reconcile::config::NetboxSettings;
use ipam_reconcile::domain::model::UpdatePolicy;
use ipam_reconcile::{FixApplier, NetboxClient, ReconcileEngine, ReportStyle};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PORTS: &str = "\
\"Port list\"
\"Exported 2024-03-01 08:00\"
\"Device\";\"Port\";\"Port Name\";\"Port Enabled\";\"VLANs\"
\"10.1.1.2\";\"1/1\";\"Uplink \";\"Yes\";\"10U\"
\"10.1.1.2\";\"1/2\";\"\";\"No\";\"\"
\"10.1.1.3\";\"1/1\";\"\";\"Yes\";\"\"
";

const DEVICES: &str = "\
\"Device list\"
\"Exported 2024-03-01 08:00\"
\"\"
\"IP Address\";\"System Name\";\"Location\"
\"10.1.1.2\";\"KA-SW-01\";\"Room 1 R12\"
\"10.1.1.3\";\"KA-SW-02\";\"Room 2\"
";

const QR_CODES: &str = "\
\"QR codes\"
\"Exported 2024-03-01 08:00\"
\"\"
\"IP Address\";\"Value\"
\"10.1.1.2\";\"HM+942-123+SN0001\"
";

fn netbox(server: &MockServer) -> Arc<NetboxClient> {
    let settings = NetboxSettings {
        url: server.base_url(),
        token: "test-token".to_string(),
        timeout: Duration::from_secs(5),
    };
    Arc::new(NetboxClient::new(&settings).unwrap())
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn page(results: serde_json::Value) -> serde_json::Value {
    let count = results.as_array().map(|r| r.len()).unwrap_or(0);
    json!({"count": count, "next": null, "previous": null, "results": results})
}

#[tokio::test]
async fn test_device_check_reports_placement_and_part_number() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/dcim/devices/")
            .query_param("name", "KA-SW-01");
        then.status(200).json_body(page(json!([{
            "id": 9, "name": "KA-SW-01",
            "rack": {"id": 1, "name": "R12"},
            "device_type": {"id": 5}
        }])));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/dcim/devices/")
            .query_param("name", "KA-SW-02");
        then.status(200).json_body(page(json!([])));
    });
    let device_type = server.mock(|when, then| {
        when.method(GET)
            .path("/api/dcim/device-types/")
            .query_param("id", "5");
        then.status(200).json_body(page(json!([
            {"id": 5, "model": "RSP35", "part_number": "942-999"}
        ])));
    });

    let client = netbox(&server);
    let mut applier = FixApplier::new(
        client.clone(),
        Arc::new(ScriptedPrompter::new(Vec::<String>::new())),
        UpdatePolicy::ReportOnly,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(DeviceCheck::new(
        client,
        write(&dir, "devices.csv", DEVICES),
        write(&dir, "qrs.csv", QR_CODES),
    ));

    let summary = engine.run(&mut applier).await.unwrap();

    device_type.assert();
    assert_eq!(summary.items, 2);
    // part number mismatch on KA-SW-01, KA-SW-02 not found
    assert_eq!(summary.findings, 2);
}

#[tokio::test]
async fn test_port_check_patches_untagged_vlan_from_global_lookup() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/ipam/ip-addresses/")
            .query_param("address", "10.1.1.2");
        then.status(200).json_body(page(json!([{
            "id": 1, "address": "10.1.1.2/24",
            "assigned_object_type": "dcim.interface",
            "assigned_object": {"id": 50, "name": "1/1", "device": {"id": 9, "name": "KA-SW-01"}}
        }])));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/ipam/ip-addresses/")
            .query_param("address", "10.1.1.3");
        then.status(200).json_body(page(json!([])));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/dcim/interfaces/")
            .query_param("device_id", "9");
        then.status(200).json_body(page(json!([
            {"id": 201, "name": "1/1", "description": "Uplink", "enabled": true,
             "untagged_vlan": {"id": 1020, "vid": 20, "name": "old"}, "tagged_vlans": []},
            {"id": 202, "name": "1/2", "description": "", "enabled": false,
             "untagged_vlan": null, "tagged_vlans": []}
        ])));
    });
    let vlans = server.mock(|when, then| {
        when.method(GET).path("/api/ipam/vlans/").query_param("vid", "10");
        then.status(200)
            .json_body(page(json!([{"id": 1010, "vid": 10, "name": "mgmt"}])));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/dcim/interfaces/201/")
            .json_body(json!({"mode": "access", "untagged_vlan": 1010}));
        then.status(200).json_body(json!({"id": 201, "name": "1/1"}));
    });

    let client = netbox(&server);
    let mut applier = FixApplier::new(
        client.clone(),
        Arc::new(ScriptedPrompter::new(Vec::<String>::new())),
        UpdatePolicy::Auto,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(PortCheck::new(client, write(&dir, "ports.csv", PORTS)));

    let summary = engine.run(&mut applier).await.unwrap();

    vlans.assert();
    patch.assert();
    assert_eq!(summary.items, 2);
    // untagged VLAN on 10.1.1.2 1/1, 10.1.1.3 not in IPAM
    assert_eq!(summary.findings, 2);
    assert_eq!(summary.applied, 1);
}

#[tokio::test]
async fn test_interface_count_mismatch_skips_switch() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let ports = "\
\"Port list\"
\"\"
\"Device\";\"Port\";\"Port Name\";\"Port Enabled\";\"VLANs\"
\"10.1.1.2\";\"1/1\";\"Changed\";\"Yes\";\"\"
";

    server.mock(|when, then| {
        when.method(GET).path("/api/ipam/ip-addresses/");
        then.status(200).json_body(page(json!([{
            "id": 1, "address": "10.1.1.2/24",
            "assigned_object_type": "dcim.interface",
            "assigned_object": {"id": 50, "device": {"id": 9, "name": "KA-SW-01"}}
        }])));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dcim/interfaces/");
        then.status(200).json_body(page(json!([
            {"id": 201, "name": "1/1"},
            {"id": 202, "name": "1/2"}
        ])));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH);
        then.status(200);
    });

    let client = netbox(&server);
    let mut applier = FixApplier::new(
        client.clone(),
        Arc::new(ScriptedPrompter::new(Vec::<String>::new())),
        UpdatePolicy::Auto,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(PortCheck::new(client, write(&dir, "ports.csv", ports)));

    let summary = engine.run(&mut applier).await.unwrap();

    assert_eq!(summary.findings, 1);
    patch.assert_hits(0);
}

#[tokio::test]
async fn test_bad_vlan_cell_still_compares_description_and_status() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let ports = "\
\"Port list\"
\"\"
\"Device\";\"Port\";\"Port Name\";\"Port Enabled\";\"VLANs\"
\"10.1.1.2\";\"1/1\";\"Changed\";\"No\";\"10U,20X\"
";

    server.mock(|when, then| {
        when.method(GET).path("/api/ipam/ip-addresses/");
        then.status(200).json_body(page(json!([{
            "id": 1, "address": "10.1.1.2/24",
            "assigned_object_type": "dcim.interface",
            "assigned_object": {"id": 50, "device": {"id": 9, "name": "KA-SW-01"}}
        }])));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dcim/interfaces/");
        then.status(200).json_body(page(json!([
            {"id": 201, "name": "1/1", "description": "Uplink", "enabled": true,
             "untagged_vlan": {"id": 1020, "vid": 20, "name": "old"}, "tagged_vlans": []}
        ])));
    });
    let description = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/dcim/interfaces/201/")
            .json_body(json!({"description": "Changed"}));
        then.status(200).json_body(json!({"id": 201, "name": "1/1"}));
    });
    let disabled = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/dcim/interfaces/201/")
            .json_body(json!({"enabled": false}));
        then.status(200).json_body(json!({"id": 201, "name": "1/1"}));
    });

    let client = netbox(&server);
    let mut applier = FixApplier::new(
        client.clone(),
        Arc::new(ScriptedPrompter::new(Vec::<String>::new())),
        UpdatePolicy::Auto,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(PortCheck::new(client, write(&dir, "ports.csv", ports)));

    let summary = engine.run(&mut applier).await.unwrap();

    // invalid VLAN list, description, enable status; VLANs are left alone
    assert_eq!(summary.findings, 3);
    assert_eq!(summary.applied, 2);
    description.assert();
    disabled.assert();
}
