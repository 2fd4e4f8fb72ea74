//! Integration tests for CLI

use assert_cmd::Command;
use git2::{IndexAddOption, Repository, Signature};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _tmp: TempDir,
    root: PathBuf,
    out: PathBuf,
}

impl Workspace {
    /// `main.py` calls into `pkg/a.py`, which calls a library function.
    fn new() -> Self {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path().join("repo");
        let out = tmp.path().join("docs");
        fs::create_dir_all(root.join("pkg")).expect("mkdir");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(root.join("main.py"), "from pkg.a import g1\n\ndef f1():\n    g1()\n").expect("write");
        fs::write(root.join("pkg/a.py"), "def g1():\n    print('hi')\n").expect("write");

        let graph = json!({
            "f1": {"name": "f1", "file_name": "main.py", "content": "def f1():\n    g1()", "callees": ["g1"]},
            "g1": {"name": "g1", "file_name": "pkg/a.py", "content": "def g1():\n    print('hi')", "callees": ["print"]},
            "print": {"name": "print", "file_name": "EXTERNAL", "content": "", "callees": []}
        });
        fs::write(out.join("call_graph.json"), graph.to_string()).expect("write graph");
        Self { _tmp: tmp, root, out }
    }

    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-docs"));
        cmd.arg(subcommand)
            .arg("--root")
            .arg(&self.root)
            .arg("--output-dir")
            .arg(&self.out)
            .env_remove("RUST_LOG");
        cmd
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.out.join(name)).expect("read output")
    }

    fn report(&self) -> Value {
        serde_json::from_str(&self.read("run-report.json")).expect("report json")
    }
}

fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().expect("index");
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None).expect("add");
    index.write().expect("write index");
    let tree = repo.find_tree(index.write_tree().expect("tree")).expect("find tree");
    let sig = Signature::now("Docs Test", "docs@example.com").expect("sig");
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("head commit")],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<_> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs).expect("commit");
}

fn cache_artifact(out: &Path, source: &str) -> String {
    let cache: Value =
        serde_json::from_str(&fs::read_to_string(out.join("cache.json")).expect("cache")).expect("json");
    cache[source]["artifact_path"].as_str().expect("artifact path").to_string()
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-docs"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("repo-docs"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-docs"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("call-graph context"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_generate_writes_docs_cache_and_report() {
    let ws = Workspace::new();
    ws.cmd("generate")
        .args(["--offline", "--no-timestamp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Documentation complete!"))
        .stdout(predicate::str::contains("Generated:        2"));

    let main_docs = ws.read("main.py.md");
    assert!(main_docs.starts_with("# main.py\n"));
    assert!(main_docs.contains("Referenced definitions from other files: 1"));
    let a_docs = ws.read("pkg/a.py.md");
    assert!(a_docs.contains("Referenced definitions from other files: 0"));

    assert!(cache_artifact(&ws.out, "main.py").ends_with("main.py.md"));
    assert!(cache_artifact(&ws.out, "pkg/a.py").ends_with("pkg/a.py.md"));

    let report = ws.report();
    assert_eq!(report["mode"], json!("full"));
    assert_eq!(report["generator"], json!("offline"));
    assert_eq!(report["files"]["generated"], json!(2));
    assert!(report.get("generated_at").is_none());
}

#[test]
fn test_generate_respects_exclude_glob_and_debug_prompts() {
    let ws = Workspace::new();
    ws.cmd("generate")
        .args(["--offline", "--save-debug", "--exclude-glob", "pkg/**"])
        .assert()
        .success();

    assert!(ws.out.join("main.py.md").exists());
    assert!(!ws.out.join("pkg/a.py.md").exists());
    let prompt = ws.read(".prompts/main.py.create.txt");
    assert!(prompt.contains("Function/Class g1:"));
    assert!(!prompt.contains("Function/Class print:"));
    assert_eq!(ws.report()["files"]["excluded"], json!(1));
}

#[test]
fn test_generate_reads_config_file_from_root() {
    let ws = Workspace::new();
    fs::write(ws.root.join("repo-docs.toml"), "[repo-docs]\ngenerator = \"offline\"\n").expect("write");

    ws.cmd("generate").assert().success();
    assert_eq!(ws.report()["generator"], json!("offline"));
}

#[test]
fn test_generate_rejects_malformed_graph() {
    let ws = Workspace::new();
    let graph = json!({
        "f1": {"name": "f1", "file_name": "main.py", "content": "", "callees": ["missing"]}
    });
    fs::write(ws.out.join("call_graph.json"), graph.to_string()).expect("write graph");

    ws.cmd("generate")
        .arg("--offline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed loading call graph"))
        .stderr(predicate::str::contains("'missing'"));
    assert!(!ws.out.join("cache.json").exists());
}

#[test]
fn test_generate_failure_still_persists_cache_and_report() {
    let ws = Workspace::new();
    ws.cmd("generate")
        .args(["--endpoint", "http://127.0.0.1:9", "--no-timestamp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 file(s) failed"));

    let report = ws.report();
    assert_eq!(report["files"]["failed"], json!(2));
    assert_eq!(report["failures"][0]["source_path"], json!("main.py"));
    assert_eq!(report["failures"][0]["stage"], json!("context_assembled"));
    assert_eq!(ws.read("cache.json").trim(), "{}");
}

#[test]
fn test_update_regenerates_only_changed_files() {
    let ws = Workspace::new();
    let repo = Repository::init(&ws.root).expect("init");
    commit_all(&repo, "Initial import");

    ws.cmd("generate").arg("--offline").assert().success();
    let a_before = ws.read("pkg/a.py.md");

    fs::write(ws.root.join("main.py"), "from pkg.a import g1\n\ndef f1():\n    return g1()\n")
        .expect("write");
    commit_all(&repo, "Return the result of g1");

    ws.cmd("update")
        .args(["--offline", "--base", "HEAD~1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated:          1"))
        .stdout(predicate::str::contains("Unchanged:        1"));

    assert!(ws.read("main.py.md").contains("updated offline"));
    assert_eq!(ws.read("pkg/a.py.md"), a_before);
    assert_eq!(ws.report()["mode"], json!("update"));
}

#[test]
fn test_update_requires_git_repository() {
    let ws = Workspace::new();
    ws.cmd("update").arg("--offline").assert().failure().stderr(predicate::str::contains("Failed collecting changes"));
}

#[test]
fn test_info_prints_graph_and_context_sizes() {
    let ws = Workspace::new();
    ws.cmd("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes:          3"))
        .stdout(predicate::str::contains("External nodes: 1"))
        .stdout(predicate::str::contains("main.py (1 definitions): 1 blocks"))
        .stdout(predicate::str::contains("pkg/a.py (1 definitions): 0 blocks"));
}
