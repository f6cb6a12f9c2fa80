//! Shared test fixtures
//!
//! Fixture repositories are bare repos on local disk, populated through
//! scratch working clones and addressed by `file://` URLs.

#![allow(dead_code)]

pub mod mock_hosting;

pub use mock_hosting::{MockHostingService, TriggerCall};

use forksync::automerge::{AutomergeOptions, CloneRoot};
use forksync::git::GitSettings;
use forksync::types::{CommitIdentity, DefaultBranch};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Identity used for every fixture commit and merge
pub fn test_identity() -> CommitIdentity {
    CommitIdentity {
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    }
}

/// Run git in `dir` and return trimmed stdout, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let identity = test_identity();
    let output = Command::new("git")
        .arg("-c")
        .arg(format!("user.name={}", identity.name))
        .arg("-c")
        .arg(format!("user.email={}", identity.email))
        .arg("-c")
        .arg("commit.gpgsign=false")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {} failed in {}: {}",
        args.join(" "),
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// `file://` URL for a local path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Whether `ancestor` is reachable from `rev` in the repository at `dir`
pub fn is_ancestor(dir: &Path, ancestor: &str, rev: &str) -> bool {
    Command::new("git")
        .args(["merge-base", "--is-ancestor", ancestor, rev])
        .current_dir(dir)
        .status()
        .expect("failed to run git")
        .success()
}

/// A bare repository plus a scratch clone used to commit into it
pub struct TempGitRepo {
    /// Bare repository (the "remote")
    pub bare: PathBuf,
    /// Working clone pushing to `bare`
    pub work: PathBuf,
}

impl TempGitRepo {
    /// New bare repo named `<name>.git` under `root` with one commit on master
    pub fn init(root: &Path, name: &str, file: &str, contents: &str, message: &str) -> Self {
        let bare = root.join(format!("{name}.git"));
        let work = root.join(format!("{name}-work"));
        fs::create_dir_all(&bare).unwrap();
        fs::create_dir_all(&work).unwrap();

        git(&bare, &["init", "--bare", "--quiet"]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git(&work, &["remote", "add", "origin", &file_url(&bare)]);

        let repo = Self { bare, work };
        repo.commit(file, contents, message);
        repo
    }

    /// Bare clone of `source` named `<name>.git`, with its own scratch clone
    pub fn fork(root: &Path, source: &Self, name: &str) -> Self {
        let bare = root.join(format!("{name}.git"));
        let work = root.join(format!("{name}-work"));

        git(
            root,
            &[
                "clone",
                "--bare",
                "--quiet",
                &file_url(&source.bare),
                bare.to_str().unwrap(),
            ],
        );
        git(
            root,
            &["clone", "--quiet", &file_url(&bare), work.to_str().unwrap()],
        );

        Self { bare, work }
    }

    /// Write `file`, commit, push master; returns the commit id
    pub fn commit(&self, file: &str, contents: &str, message: &str) -> String {
        fs::write(self.work.join(file), contents).unwrap();
        git(&self.work, &["add", file]);
        git(&self.work, &["commit", "--quiet", "-m", message]);
        git(&self.work, &["push", "--quiet", "origin", "master"]);
        git(&self.work, &["rev-parse", "HEAD"])
    }

    /// `file://` URL of the bare repository
    pub fn url(&self) -> String {
        file_url(&self.bare)
    }

    /// Commit a ref points at in the bare repository
    pub fn rev_parse(&self, rev: &str) -> String {
        git(&self.bare, &["rev-parse", rev])
    }

    /// Whether the bare repository has `refs/heads/<branch>`
    pub fn has_branch(&self, branch: &str) -> bool {
        Command::new("git")
            .args([
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{branch}"),
            ])
            .current_dir(&self.bare)
            .status()
            .expect("failed to run git")
            .success()
    }
}

/// A fork and its upstream on local disk
pub struct ForkFixture {
    /// Owns every fixture directory
    pub dir: TempDir,
    /// Upstream repository
    pub parent: TempGitRepo,
    /// Fork repository
    pub child: TempGitRepo,
    /// Commits by label (P1, P2, C1)
    pub p1: String,
    pub p2: Option<String>,
    pub c1: Option<String>,
}

impl ForkFixture {
    /// Clone root for runs against this fixture (inside the fixture dir)
    pub fn clone_root(&self) -> PathBuf {
        self.dir.path().join("clones")
    }

    /// Options that clone under [`Self::clone_root`] with the test identity
    pub fn options(&self) -> AutomergeOptions {
        AutomergeOptions {
            clone_root: CloneRoot::Fixed(self.clone_root()),
            default_branch: DefaultBranch::Auto,
            git: GitSettings {
                network_timeout: None,
                identity: Some(test_identity()),
            },
            ..AutomergeOptions::default()
        }
    }
}

/// Parent has P1, P2; child was forked at P1 and added C1 (`hello.py`)
pub fn prepare_forked_repos() -> ForkFixture {
    let dir = TempDir::new().unwrap();
    let parent = TempGitRepo::init(dir.path(), "parent", "README.md", "# parent\n", "P1");
    let p1 = parent.rev_parse("master");

    let child = TempGitRepo::fork(dir.path(), &parent, "child");
    let c1 = child.commit("hello.py", "print('hello')\n", "C1");
    let p2 = parent.commit("parent.txt", "upstream change\n", "P2");

    ForkFixture {
        dir,
        parent,
        child,
        p1,
        p2: Some(p2),
        c1: Some(c1),
    }
}

/// Child and parent share one history (P1 only)
pub fn prepare_identical_repos() -> ForkFixture {
    let dir = TempDir::new().unwrap();
    let parent = TempGitRepo::init(dir.path(), "parent", "README.md", "# parent\n", "P1");
    let p1 = parent.rev_parse("master");
    let child = TempGitRepo::fork(dir.path(), &parent, "child");

    ForkFixture {
        dir,
        parent,
        child,
        p1,
        p2: None,
        c1: None,
    }
}

/// Child and parent both add `hello.py` with different contents
pub fn prepare_conflicting_repos() -> ForkFixture {
    let dir = TempDir::new().unwrap();
    let parent = TempGitRepo::init(dir.path(), "parent", "README.md", "# parent\n", "P1");
    let p1 = parent.rev_parse("master");

    let child = TempGitRepo::fork(dir.path(), &parent, "child");
    let c1 = child.commit("hello.py", "print('hello from the fork')\n", "C1");
    let p2 = parent.commit("hello.py", "print('hello from upstream')\n", "P2");

    ForkFixture {
        dir,
        parent,
        child,
        p1,
        p2: Some(p2),
        c1: Some(c1),
    }
}
