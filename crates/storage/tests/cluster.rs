// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A naming service and storage nodes talking over loopback TCP.

use common::{
    CommandStub, Error, PathKey, Registration, Service, Storage, StorageNodeHandle, StorageStub,
};
use naming::{NamingServer, RunningNaming};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use storage::{Endpoints, PruneReport, RunningStorage, StorageServer};
use tempfile::TempDir;

fn p(s: &str) -> PathKey {
    PathKey::parse(s).unwrap()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn any_port() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn start_naming() -> RunningNaming {
    RunningNaming::start(Arc::new(NamingServer::new()), any_port(), any_port())
        .await
        .unwrap()
}

async fn start_storage(naming: &RunningNaming, root: &Path) -> RunningStorage {
    StorageServer::new(root, Endpoints::default())
        .start(&naming.registration_stub())
        .await
        .unwrap()
}

fn populate(root: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        let local = root.join(name);
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(local, data).unwrap();
    }
}

#[tokio::test]
async fn test_two_nodes_without_overlap() {
    let naming = start_naming().await;
    let (one, two) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    populate(one.path(), &[("a/1", b"first")]);
    populate(two.path(), &[("a/2", b"second")]);

    let first = start_storage(&naming, one.path()).await;
    let second = start_storage(&naming, two.path()).await;
    assert_eq!(first.pruned(), PruneReport::default());
    assert_eq!(second.pruned(), PruneReport::default());

    let service = naming.service_stub();
    assert_eq!(service.list(&p("/a")).await, Ok(names(&["1", "2"])));
    assert_eq!(service.is_directory(&p("/a")).await, Ok(true));

    let stub = service.get_storage(&p("/a/1")).await.unwrap();
    assert_eq!(stub, first.handle().storage);
    assert_eq!(stub.read(&p("/a/1"), 0, 5).await.unwrap(), b"first");

    let stub = service.get_storage(&p("/a/2")).await.unwrap();
    assert_eq!(stub, second.handle().storage);
    assert_eq!(stub.size(&p("/a/2")).await, Ok(6));

    first.stop().await;
    second.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_single_node_registers_without_duplicates() {
    let naming = start_naming().await;
    let root = TempDir::new().unwrap();
    populate(root.path(), &[("a/1", b"one"), ("a/2", b"two")]);

    let node = start_storage(&naming, root.path()).await;
    assert_eq!(node.pruned(), PruneReport::default());
    assert_eq!(naming.server().node_count().await, 1);
    assert!(root.path().join("a/1").is_file());
    assert!(root.path().join("a/2").is_file());

    let service = naming.service_stub();
    assert_eq!(service.list(&p("/a")).await, Ok(names(&["1", "2"])));
    for (path, data) in [("/a/1", b"one"), ("/a/2", b"two")] {
        let stub = service.get_storage(&p(path)).await.unwrap();
        assert_eq!(stub, node.handle().storage);
        assert_eq!(stub.read(&p(path), 0, 3).await.unwrap(), data);
    }

    node.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_duplicates_are_pruned_on_the_later_node() {
    let naming = start_naming().await;
    let (one, two) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    populate(one.path(), &[("shared/x", b"original"), ("y", b"y")]);
    populate(two.path(), &[("shared/x", b"copy"), ("z", b"z")]);

    let first = start_storage(&naming, one.path()).await;
    let second = start_storage(&naming, two.path()).await;
    assert_eq!(
        second.pruned(),
        PruneReport {
            files: 1,
            directories: 1
        }
    );
    assert!(!two.path().join("shared").exists());
    assert!(two.path().join("z").is_file());
    assert!(two.path().is_dir());

    let service = naming.service_stub();
    let owner = service.get_storage(&p("/shared/x")).await.unwrap();
    assert_eq!(owner, first.handle().storage);
    assert_eq!(owner.read(&p("/shared/x"), 0, 8).await.unwrap(), b"original");
    assert_eq!(service.list(&PathKey::root()).await, Ok(names(&["shared", "y", "z"])));

    first.stop().await;
    second.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_create_write_read_delete() {
    let naming = start_naming().await;
    let root = TempDir::new().unwrap();
    let node = start_storage(&naming, root.path()).await;
    let service = naming.service_stub();

    assert_eq!(service.create_directory(&p("/docs")).await, Ok(true));
    assert_eq!(service.create_file(&p("/docs/note")).await, Ok(true));
    assert_eq!(service.create_file(&p("/docs/note")).await, Ok(false));
    assert!(root.path().join("docs/note").is_file());

    let stub = service.get_storage(&p("/docs/note")).await.unwrap();
    tokio_test::assert_ok!(stub.write(&p("/docs/note"), 0, b"hello").await);
    tokio_test::assert_ok!(stub.write(&p("/docs/note"), 8, b"!").await);
    assert_eq!(stub.size(&p("/docs/note")).await, Ok(9));
    assert_eq!(
        stub.read(&p("/docs/note"), 0, 9).await.unwrap(),
        b"hello\0\0\0!"
    );
    assert!(matches!(
        stub.read(&p("/docs/note"), 5, 10).await,
        Err(Error::OutOfBounds(_))
    ));

    assert_eq!(service.delete(&p("/docs")).await, Ok(true));
    assert_eq!(service.exists(&p("/docs/note")).await, Ok(false));
    assert!(!root.path().join("docs").exists());
    assert!(matches!(
        service.get_storage(&p("/docs/note")).await,
        Err(Error::NotFound(_))
    ));

    node.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_create_file_needs_existing_parent() {
    let naming = start_naming().await;
    let root = TempDir::new().unwrap();
    let node = start_storage(&naming, root.path()).await;
    let service = naming.service_stub();

    assert!(matches!(
        service.create_file(&p("/missing/file")).await,
        Err(Error::NotFound(_))
    ));
    assert_eq!(service.exists(&p("/missing")).await, Ok(false));

    node.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_delete_spans_nodes() {
    let naming = start_naming().await;
    let (one, two) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    populate(one.path(), &[("tree/a", b"a")]);
    populate(two.path(), &[("tree/b", b"b")]);

    let first = start_storage(&naming, one.path()).await;
    let second = start_storage(&naming, two.path()).await;
    let service = naming.service_stub();

    assert_eq!(service.delete(&p("/tree")).await, Ok(true));
    assert!(!one.path().join("tree").exists());
    assert!(!two.path().join("tree").exists());
    assert_eq!(service.list(&PathKey::root()).await, Ok(BTreeSet::new()));

    first.stop().await;
    second.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_delete_continues_past_unreachable_owner() {
    let naming = start_naming().await;
    // Port 1 on loopback refuses connections
    let nowhere = SocketAddr::from(([127, 0, 0, 1], 1));
    let dead = StorageNodeHandle::new(StorageStub::new(nowhere), CommandStub::new(nowhere));
    _ = naming
        .server()
        .register(dead, [p("/tree/a")].into_iter().collect())
        .await
        .unwrap();

    let root = TempDir::new().unwrap();
    populate(root.path(), &[("tree/b", b"b"), ("kept", b"k")]);
    let live = start_storage(&naming, root.path()).await;
    assert!(dead < live.handle());
    let service = naming.service_stub();

    let result = service.delete(&p("/tree")).await;
    let Err(err) = result else {
        panic!("delete reported success with an unreachable owner");
    };
    let Error::Unavailable(message) = err else {
        panic!("expected Unavailable, got {err:?}");
    };
    assert!(message.contains("127.0.0.1:1"));

    assert!(!root.path().join("tree").exists());
    assert!(root.path().join("kept").is_file());
    assert_eq!(service.exists(&p("/tree")).await, Ok(false));
    assert_eq!(service.list(&PathKey::root()).await, Ok(names(&["kept"])));

    live.stop().await;
    naming.stop().await;
}

#[tokio::test]
async fn test_missing_root_does_not_register() {
    let naming = start_naming().await;
    let dir = TempDir::new().unwrap();

    let result = StorageServer::new(dir.path().join("absent"), Endpoints::default())
        .start(&naming.registration_stub())
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(naming.server().node_count().await, 0);

    naming.stop().await;
}

#[tokio::test]
async fn test_unreachable_naming_service() {
    let dir = TempDir::new().unwrap();
    let nowhere = common::RegistrationStub::new(SocketAddr::from(([127, 0, 0, 1], 1)));

    let result = StorageServer::new(dir.path(), Endpoints::default())
        .start(&nowhere)
        .await;
    let Err(err) = result else {
        panic!("registration with an unreachable naming service succeeded");
    };
    assert!(err.is_transport());
}
