use std::path::PathBuf;

use storage_backup::client::{api_error_message, ListItem, SupabaseStorageClient};
use storage_backup_core::config::StorageConfig;
use storage_backup_core::contract::{Bucket, ObjectMetadata, RemoteEntry};

fn client_for(url: &str) -> SupabaseStorageClient {
    SupabaseStorageClient::new(&StorageConfig {
        url: url.to_string(),
        service_role_key: "key".to_string(),
        backup_dir: PathBuf::from("backups/storage"),
    })
    .expect("client should build")
}

#[test]
fn test_list_items_with_null_id_are_folders() {
    let body = r#"[
        {"name": "img", "id": null, "updated_at": null, "metadata": null},
        {"name": "cat.png", "id": "9f1c", "metadata": {"size": 1234, "mimetype": "image/png", "eTag": "\"abc\""}},
        {"name": "bare"}
    ]"#;

    let items: Vec<ListItem> = serde_json::from_str(body).expect("listing should decode");
    let entries: Vec<RemoteEntry> = items.into_iter().map(RemoteEntry::from).collect();

    assert_eq!(
        entries,
        vec![
            RemoteEntry::Folder {
                name: "img".to_string()
            },
            RemoteEntry::File {
                name: "cat.png".to_string(),
                metadata: ObjectMetadata {
                    id: "9f1c".to_string(),
                    size: Some(1234),
                    mimetype: Some("image/png".to_string()),
                },
            },
            RemoteEntry::Folder {
                name: "bare".to_string()
            },
        ]
    );
}

#[test]
fn test_bucket_listing_decodes_into_bucket_records() {
    let body = r#"[
        {"id": "docs", "name": "docs", "owner": "", "public": true, "file_size_limit": 1048576,
         "allowed_mime_types": ["application/pdf"], "created_at": "2024-01-01T00:00:00Z"},
        {"id": "avatars", "name": "avatars", "public": false, "file_size_limit": null, "allowed_mime_types": null}
    ]"#;

    let buckets: Vec<Bucket> = serde_json::from_str(body).unwrap();

    assert_eq!(
        buckets,
        vec![
            Bucket {
                name: "docs".to_string(),
                public: true,
                file_size_limit: Some(1_048_576),
                allowed_mime_types: Some(vec!["application/pdf".to_string()]),
            },
            Bucket::private("avatars"),
        ]
    );
}

#[test]
fn test_endpoint_builds_storage_api_paths() {
    let client = client_for("https://project.supabase.co");

    assert_eq!(
        client.endpoint(["bucket"]).unwrap().as_str(),
        "https://project.supabase.co/storage/v1/bucket"
    );
    assert_eq!(
        client.endpoint(["object", "list", "photos"]).unwrap().as_str(),
        "https://project.supabase.co/storage/v1/object/list/photos"
    );
}

#[test]
fn test_object_url_keeps_folders_and_encodes_segments() {
    let client = client_for("http://localhost:54321/");

    assert_eq!(
        client.object_url("photos", "img/cat.png").unwrap().as_str(),
        "http://localhost:54321/storage/v1/object/photos/img/cat.png"
    );
    assert_eq!(
        client.object_url("photos", "my pics/a#1.png").unwrap().as_str(),
        "http://localhost:54321/storage/v1/object/photos/my%20pics/a%231.png"
    );
}

#[test]
fn test_client_rejects_non_base_url() {
    let result = SupabaseStorageClient::new(&StorageConfig {
        url: "mailto:ops@example.com".to_string(),
        service_role_key: "key".to_string(),
        backup_dir: PathBuf::from("backups/storage"),
    });
    assert!(result.is_err());
}

#[test]
fn test_api_error_message_prefers_json_message() {
    assert_eq!(
        api_error_message(r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#),
        "Object not found"
    );
    assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
}
