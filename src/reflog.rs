//! Append-only reflog, in the teacher's `ReflogAction`/`with_reflog`
//! shape, reinterpreted for lock-guard rather than DB-transaction scoping.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::hash::ObjectId;

#[derive(Debug, Clone)]
pub enum ReflogAction {
    Commit { amend: bool, subject: String },
    Clone { from: String },
    Push { remote: String },
    Switch { from: String, to: String },
}

impl ReflogAction {
    fn message(&self) -> String {
        match self {
            ReflogAction::Commit { amend: false, subject } => format!("commit: {subject}"),
            ReflogAction::Commit { amend: true, subject } => format!("commit (amend): {subject}"),
            ReflogAction::Clone { from } => format!("clone: from {from}"),
            ReflogAction::Push { remote } => format!("push: to {remote}"),
            ReflogAction::Switch { from, to } => format!("checkout: moving from {from} to {to}"),
        }
    }
}

pub struct ReflogContext {
    pub old_oid: ObjectId,
    pub new_oid: ObjectId,
    pub action: ReflogAction,
}

/// Appends one line to `<gitDir>/logs/<ref_name>` (and `logs/HEAD` when
/// `log_for_ref` requests it), after `op` has committed its ref update
/// under the caller's own lock. The scope here is "run `op`, then
/// record it" — there is no transaction to roll back, only a log append
/// that should not happen if `op` failed.
pub fn with_reflog<F>(git_dir: &Path, ref_name: &str, context: ReflogContext, op: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    op()?;
    append(git_dir, ref_name, &context)
}

fn append(git_dir: &Path, ref_name: &str, context: &ReflogContext) -> Result<()> {
    let log_path = git_dir.join("logs").join(ref_name);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let now = chrono::Utc::now().timestamp();
    let line = format!(
        "{} {} {} <{}> {} +0000\t{}\n",
        context.old_oid,
        context.new_oid,
        "porcelain",
        "porcelain@localhost",
        now,
        context.action.message()
    );
    let mut file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}
