use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("keyschema_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const APP_YAML: &str = r#"separator: ":"
keys:
  user: ["user", { string: id }]
  appConfig: ["config"]
  session:
    active: ["active", { boolean: mobile }]
  posts:
    $parameterize: { string: postId }
    $schema:
      detail: ["detail"]
      comments: ["comments", { number: page }]
  legacy: ~
"#;

fn write_document(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write document");
    path
}

fn keyschema(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_keyschema"))
        .args(args)
        .output()
        .expect("failed to run keyschema")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_document() {
    let dir = TempDir::new("validate_ok");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["validate", doc.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("5 key(s)"));
}

#[test]
fn validate_reports_duplicate_placeholders() {
    let dir = TempDir::new("validate_dup");
    let doc = write_document(
        &dir,
        "keys.yaml",
        r#"keys:
  posts:
    $parameterize: { string: id }
    $schema:
      comments: ["comments", { string: id }]
"#,
    );

    let output = keyschema(&["validate", doc.to_str().unwrap()]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("duplicate placeholder `id` at `posts.comments`"), "stderr: {err}");
    assert!(err.contains("1 problem(s)"));
}

#[test]
fn validate_reports_configuration_errors() {
    let dir = TempDir::new("validate_config");
    let doc = write_document(
        &dir,
        "keys.json",
        r#"{"keys": {"p": {"$parameterize": [], "$schema": {}}}}"#,
    );

    let output = keyschema(&["validate", doc.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("at least one placeholder required"));
}

// ---------------------------------------------------------------------------
// templates / fingerprint
// ---------------------------------------------------------------------------

#[test]
fn templates_json_lists_layout() {
    let dir = TempDir::new("templates_json");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["templates", doc.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let templates: Vec<&str> = layout["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["template"].as_str().unwrap())
        .collect();
    assert!(templates.contains(&"posts:{postId}:comments:{page}"));
    assert!(templates.contains(&"config"));
    assert_eq!(templates.len(), 5);
}

#[test]
fn templates_table_honours_separator_override() {
    let dir = TempDir::new("templates_table");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["templates", doc.to_str().unwrap(), "--separator", "/"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("session/active/{mobile}"));
}

#[test]
fn fingerprint_is_stable_and_tracks_separator() {
    let dir = TempDir::new("fingerprint");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);
    let path = doc.to_str().unwrap();

    let first = stdout(&keyschema(&["fingerprint", path]));
    let second = stdout(&keyschema(&["fingerprint", path]));
    let other = stdout(&keyschema(&["--separator", "|", "fingerprint", path]));

    assert_eq!(first.trim().len(), 64);
    assert_eq!(first, second);
    assert_ne!(first, other);
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_builds_parameterized_key() {
    let dir = TempDir::new("render_ok");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&[
        "render",
        doc.to_str().unwrap(),
        "posts.comments",
        "--arg",
        "postId=p9",
        "--arg",
        "page=2",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "posts:p9:comments:2");
}

#[test]
fn render_parses_booleans() {
    let dir = TempDir::new("render_bool");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&[
        "render",
        doc.to_str().unwrap(),
        "session.active",
        "--arg",
        "mobile=true",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "session:active:true");
}

#[test]
fn render_reaches_dotted_mapping_keys_by_segment() {
    let dir = TempDir::new("render_segment");
    let doc = write_document(
        &dir,
        "keys.yaml",
        r#"keys:
  "v1.users":
    byId: ["users", { number: id }]
"#,
    );
    let path = doc.to_str().unwrap();

    let dotted = keyschema(&["render", path, "v1.users.byId", "--arg", "id=1"]);
    assert!(!dotted.status.success());

    let output = keyschema(&[
        "render",
        path,
        "--segment",
        "v1.users",
        "--segment",
        "byId",
        "--arg",
        "id=9007199254740993",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "v1.users:users:9007199254740993");
}

#[test]
fn render_reports_missing_argument() {
    let dir = TempDir::new("render_missing");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["render", doc.to_str().unwrap(), "user"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing argument `id` for key path `user:id`"));
}

#[test]
fn render_rejects_unknown_argument() {
    let dir = TempDir::new("render_unknown");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["render", doc.to_str().unwrap(), "user", "--arg", "name=x"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown argument 'name'"));
}

#[test]
fn render_rejects_unknown_path() {
    let dir = TempDir::new("render_path");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["render", doc.to_str().unwrap(), "legacy"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No key at 'legacy'"));
}

// ---------------------------------------------------------------------------
// codegen
// ---------------------------------------------------------------------------

#[test]
fn codegen_writes_rust_file() {
    let dir = TempDir::new("codegen");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);
    let out = dir.join("generated/keys.rs");

    let output = keyschema(&[
        "codegen",
        doc.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--root",
        "AppKeys",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let code = fs::read_to_string(&out).unwrap();
    assert!(code.contains("pub struct AppKeys {"));
    assert!(code.contains("pub fn posts(&self, post_id: &str) -> AppKeysPosts {"));
    assert!(code.contains("pub const SEPARATOR: &str = \":\";"));
}

#[test]
fn codegen_prints_to_stdout_by_default() {
    let dir = TempDir::new("codegen_stdout");
    let doc = write_document(&dir, "keys.yaml", APP_YAML);

    let output = keyschema(&["codegen", doc.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("pub struct Keys {"));
}
