// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Client commands against an in-process cluster on loopback TCP.

use cmd::commands::{
    cat_command, exists_command, list_command, mkdir_command, rm_command, stat_command,
    touch_command, write_command,
};
use naming::{NamingServer, RunningNaming};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::{Endpoints, RunningStorage, StorageServer};
use tempfile::TempDir;

struct Cluster {
    naming: RunningNaming,
    node: RunningStorage,
    root: TempDir,
}

impl Cluster {
    async fn start() -> Self {
        let any = SocketAddr::from(([127, 0, 0, 1], 0));
        let naming = RunningNaming::start(Arc::new(NamingServer::new()), any, any)
            .await
            .unwrap();
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("seed")).unwrap();
        std::fs::write(root.path().join("seed/hello.txt"), b"Hello, World!").unwrap();

        let node = StorageServer::new(root.path(), Endpoints::default())
            .start(&naming.registration_stub())
            .await
            .unwrap();
        Self { naming, node, root }
    }

    async fn stop(self) {
        self.node.stop().await;
        self.naming.stop().await;
    }
}

#[tokio::test]
async fn test_listing_and_stat() {
    let cluster = Cluster::start().await;
    let service = cluster.naming.service_stub();

    assert!(exists_command(&service, "/seed/hello.txt").await.unwrap());
    assert!(!exists_command(&service, "/seed/missing").await.unwrap());
    assert!(exists_command(&service, "seed").await.is_err());

    assert_eq!(list_command(&service, "/").await.unwrap(), vec!["seed/"]);
    assert_eq!(
        list_command(&service, "/seed").await.unwrap(),
        vec!["hello.txt"]
    );

    let stat = stat_command(&service, "/seed/hello.txt").await.unwrap();
    assert!(stat.contains("file"));
    assert!(stat.contains("13 bytes"));
    let stat = stat_command(&service, "/seed").await.unwrap();
    assert!(stat.contains("directory"));

    cluster.stop().await;
}

#[tokio::test]
async fn test_file_lifecycle() {
    let cluster = Cluster::start().await;
    let service = cluster.naming.service_stub();

    mkdir_command(&service, "/a/b", true).await.unwrap();
    mkdir_command(&service, "/a/b", true).await.unwrap();
    assert!(mkdir_command(&service, "/a/b", false).await.is_err());

    assert!(touch_command(&service, "/a/b/f").await.unwrap());
    assert!(!touch_command(&service, "/a/b/f").await.unwrap());
    assert!(cluster.root.path().join("a/b/f").is_file());

    write_command(&service, "/a/b/f", 0, b"abcdef", false)
        .await
        .unwrap();
    assert_eq!(
        cat_command(&service, "/a/b/f", 0, None).await.unwrap(),
        b"abcdef"
    );
    assert_eq!(
        cat_command(&service, "/a/b/f", 2, Some(3)).await.unwrap(),
        b"cde"
    );
    assert!(cat_command(&service, "/a/b/f", 4, Some(5)).await.is_err());

    rm_command(&service, "/a").await.unwrap();
    assert!(!exists_command(&service, "/a/b/f").await.unwrap());
    assert!(!cluster.root.path().join("a").exists());
    assert!(rm_command(&service, "/").await.is_err());

    cluster.stop().await;
}

#[tokio::test]
async fn test_write_with_create() {
    let cluster = Cluster::start().await;
    let service = cluster.naming.service_stub();

    assert!(write_command(&service, "/seed/new", 0, b"x", false).await.is_err());
    tokio_test::assert_ok!(write_command(&service, "/seed/new", 0, b"x", true).await);
    assert_eq!(cat_command(&service, "/seed/new", 0, None).await.unwrap(), b"x");

    cluster.stop().await;
}

#[tokio::test]
async fn test_mkdir_through_a_file_fails() {
    let cluster = Cluster::start().await;
    let service = cluster.naming.service_stub();

    let err = mkdir_command(&service, "/seed/hello.txt/sub", true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is a file"));

    cluster.stop().await;
}
