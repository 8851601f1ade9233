use std::sync::Arc;
use std::thread;

use keyschema_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_schema() -> NestedSchema {
    NestedSchema::new()
        .key("user", key!["user", Placeholder::string("id")])
        .key("appConfig", key!["config"])
        .nested(
            "session",
            NestedSchema::new()
                .key("active", key!["active", Placeholder::boolean("mobile")])
                .key("byDevice", key!["device", Placeholder::string("device")]),
        )
        .parameterized(
            "posts",
            parameterize(
                Placeholder::string("postId"),
                NestedSchema::new()
                    .key("detail", key!["detail"])
                    .key("comments", key!["comments", Placeholder::number("page")])
                    .parameterized(
                        "reactions",
                        parameterize(
                            [Placeholder::string("kind"), Placeholder::number("bucket")],
                            NestedSchema::new().key("count", key!["count"]),
                        )
                        .unwrap(),
                    ),
            )
            .unwrap(),
        )
        .absent("legacy")
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_user_key_with_default_separator() {
    let schema = NestedSchema::new().key("user", key!["user", Placeholder::string("id")]);
    let keys = create_key_builder(BuilderConfig::default()).compile(&schema);
    let user = keys.key("user").unwrap();
    assert!(user.takes_args());
    assert_eq!(user.build(&args! { "id" => "42" }).unwrap(), "user:42");
}

#[test]
fn test_parameterized_key_with_arrow_separator() {
    let schema = NestedSchema::new().parameterized(
        "a",
        parameterize(
            Placeholder::string("t"),
            NestedSchema::new().key("b", key!["b"]),
        )
        .unwrap(),
    );
    let keys = create_key_builder(BuilderConfig::with_separator("->")).compile(&schema);
    let b = keys
        .parameterized("a")
        .unwrap()
        .apply(&args! { "t" => "9" })
        .unwrap();
    assert_eq!(b.key("b").unwrap().build_static().unwrap(), "a->9->b");
}

#[test]
fn test_deeply_nested_parameterizations() {
    let keys = KeyBuilder::default().compile(&app_schema());
    let post = keys
        .parameterized("posts")
        .unwrap()
        .apply(&args! { "postId" => "p1" })
        .unwrap();
    let reactions = post
        .parameterized("reactions")
        .unwrap()
        .apply(&args! { "bucket" => 3, "kind" => "like" })
        .unwrap();
    assert_eq!(
        reactions.key("count").unwrap().build_static().unwrap(),
        "posts:p1:reactions:like:3:count"
    );
    assert_eq!(
        post.key("comments").unwrap().build(&args! { "page" => 1.5 }).unwrap(),
        "posts:p1:comments:1.5"
    );
}

#[test]
fn test_boolean_placeholder_text() {
    let keys = KeyBuilder::default().compile(&app_schema());
    let active = keys.nested("session").unwrap().key("active").unwrap();
    assert_eq!(
        active.build(&args! { "mobile" => true }).unwrap(),
        "session:active:true"
    );
}

#[test]
fn test_large_integer_ids_build_distinct_keys() {
    let keys = KeyBuilder::default().compile(&app_schema());
    let user = keys.key("user").unwrap();

    let a = user.build(&args! { "id" => 9_007_199_254_740_993u64 }).unwrap();
    let b = user.build(&args! { "id" => 9_007_199_254_740_992u64 }).unwrap();
    assert_eq!(a, "user:9007199254740993");
    assert_ne!(a, b);
    assert_eq!(
        user.build(&args! { "id" => 1_234_567_890_123_456_789i64 }).unwrap(),
        "user:1234567890123456789"
    );

    let from_json: Args = serde_json::from_str(r#"{"id": 12345678901234567890}"#).unwrap();
    assert_eq!(user.build(&from_json).unwrap(), "user:12345678901234567890");
}

#[test]
fn test_absent_entry_produces_no_property() {
    let keys = KeyBuilder::default().compile(&app_schema());
    assert!(keys.get("legacy").is_none());
    assert_eq!(
        keys.names().collect::<Vec<_>>(),
        vec!["appConfig", "posts", "session", "user"]
    );
}

#[test]
fn test_missing_argument_message_names_placeholder_and_path() {
    let keys = KeyBuilder::default().compile(&app_schema());
    let err = keys
        .nested("session")
        .unwrap()
        .key("byDevice")
        .unwrap()
        .build(&Args::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing argument `device` for key path `session:device:device`"
    );
}

#[test]
fn test_resolve_key_threads_one_argument_mapping() {
    let keys = KeyBuilder::default().compile(&app_schema());
    let args = args! { "postId" => "p2", "kind" => "wow", "bucket" => 0 };
    assert_eq!(
        keys.resolve_key(&["posts", "reactions", "count"], &args).unwrap(),
        "posts:p2:reactions:wow:0:count"
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_separator_only_changes_separators() {
    let schema = app_schema();
    let args = args! { "postId" => "p", "page" => 4 };
    let colon = KeyBuilder::default().compile(&schema);
    let pipe = KeyBuilder::new(BuilderConfig::with_separator("|")).compile(&schema);
    let a = colon.resolve_key(&["posts", "comments"], &args).unwrap();
    let b = pipe.resolve_key(&["posts", "comments"], &args).unwrap();
    assert_eq!(a.split(':').collect::<Vec<_>>(), b.split('|').collect::<Vec<_>>());
}

#[test]
fn test_templates_match_compiled_templates() {
    let schema = app_schema();
    let templates = key_templates(&schema);
    assert_eq!(templates.len(), 7);

    let keys = KeyBuilder::default().compile(&schema);
    let user = templates.iter().find(|t| t.dotted_path() == "user").unwrap();
    assert_eq!(user.render(":"), "user:{id}");
    assert_eq!(keys.key("user").unwrap().template(), "user:id");
}

#[test]
fn test_concurrent_callers_share_one_tree() {
    let keys = Arc::new(KeyBuilder::default().compile(&app_schema()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let keys = Arc::clone(&keys);
            thread::spawn(move || {
                let args = args! { "postId" => format!("p{i}"), "page" => i };
                keys.resolve_key(&["posts", "comments"], &args).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("posts:p{i}:comments:{i}"));
    }
}
