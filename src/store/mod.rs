//! In-memory result store.
//!
//! Tables are plain vectors indexed by store-assigned ids. The whole state sits
//! behind one `RwLock`, so a writer holding the guard sees a consistent snapshot
//! for the duration of a save.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{
    Benchmark, BenchmarkResult, Branch, Environment, Executable, Id, Project, Report, Revision,
};

/// Shared handle to the store.
#[derive(Clone, Default)]
pub struct ResultStore {
    state: Arc<RwLock<StoreState>>,
}

impl ResultStore {
    /// Create a store with the given environments registered.
    pub fn with_environments<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = StoreState::default();
        for name in names {
            state.add_environment(name.into());
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> AppResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| AppError::Storage("result store lock poisoned".to_string()))
    }

    pub fn write(&self) -> AppResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| AppError::Storage("result store lock poisoned".to_string()))
    }
}

/// All recorded data.
#[derive(Debug, Default)]
pub struct StoreState {
    projects: Vec<Project>,
    branches: Vec<Branch>,
    revisions: Vec<Revision>,
    executables: Vec<Executable>,
    benchmarks: Vec<Benchmark>,
    environments: Vec<Environment>,
    results: Vec<BenchmarkResult>,
    reports: Vec<Report>,
}

fn next_id(len: usize) -> Id {
    len as Id + 1
}

fn by_id<T>(table: &[T], id: Id) -> Option<&T> {
    id.checked_sub(1).and_then(|i| table.get(i as usize))
}

impl StoreState {
    // ------------------------------------------------------------------
    // Environments
    // ------------------------------------------------------------------

    /// Register an environment, returning the existing one if the name is taken.
    pub fn add_environment(&mut self, name: String) -> Id {
        if let Some(env) = self.environment_by_name(&name) {
            return env.id;
        }
        let id = next_id(self.environments.len());
        self.environments.push(Environment { id, name });
        id
    }

    pub fn environment_by_name(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn environment(&self, id: Id) -> Option<&Environment> {
        by_id(&self.environments, id)
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    // ------------------------------------------------------------------
    // Projects, branches, executables
    // ------------------------------------------------------------------

    pub fn get_or_create_project(&mut self, name: &str) -> Id {
        if let Some(p) = self.projects.iter().find(|p| p.name == name) {
            return p.id;
        }
        let id = next_id(self.projects.len());
        self.projects.push(Project {
            id,
            name: name.to_string(),
            track: true,
        });
        id
    }

    pub fn project(&self, id: Id) -> Option<&Project> {
        by_id(&self.projects, id)
    }

    pub fn project_mut(&mut self, id: Id) -> Option<&mut Project> {
        id.checked_sub(1)
            .and_then(|i| self.projects.get_mut(i as usize))
    }

    pub fn get_or_create_branch(&mut self, project_id: Id, name: &str) -> Id {
        if let Some(b) = self
            .branches
            .iter()
            .find(|b| b.project_id == project_id && b.name == name)
        {
            return b.id;
        }
        let id = next_id(self.branches.len());
        self.branches.push(Branch {
            id,
            project_id,
            name: name.to_string(),
        });
        id
    }

    pub fn branch(&self, id: Id) -> Option<&Branch> {
        by_id(&self.branches, id)
    }

    pub fn get_or_create_executable(&mut self, project_id: Id, name: &str) -> Id {
        if let Some(e) = self
            .executables
            .iter()
            .find(|e| e.project_id == project_id && e.name == name)
        {
            return e.id;
        }
        let id = next_id(self.executables.len());
        self.executables.push(Executable {
            id,
            project_id,
            name: name.to_string(),
        });
        id
    }

    pub fn executable(&self, id: Id) -> Option<&Executable> {
        by_id(&self.executables, id)
    }

    // ------------------------------------------------------------------
    // Benchmarks
    // ------------------------------------------------------------------

    pub fn benchmark_by_name(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|b| b.name == name)
    }

    pub fn benchmark(&self, id: Id) -> Option<&Benchmark> {
        by_id(&self.benchmarks, id)
    }

    /// Insert a benchmark built by `make` from its new id.
    pub fn insert_benchmark(&mut self, make: impl FnOnce(Id) -> Benchmark) -> Id {
        let id = next_id(self.benchmarks.len());
        self.benchmarks.push(make(id));
        id
    }

    // ------------------------------------------------------------------
    // Revisions
    // ------------------------------------------------------------------

    pub fn revision_by_commit(&self, branch_id: Id, commitid: &str) -> Option<&Revision> {
        self.revisions
            .iter()
            .find(|r| r.branch_id == branch_id && r.commitid == commitid)
    }

    pub fn insert_revision(
        &mut self,
        branch_id: Id,
        project_id: Id,
        commitid: &str,
        date: DateTime<Utc>,
    ) -> Id {
        let id = next_id(self.revisions.len());
        self.revisions.push(Revision {
            id,
            branch_id,
            project_id,
            commitid: commitid.to_string(),
            date,
        });
        id
    }

    pub fn revision(&self, id: Id) -> Option<&Revision> {
        by_id(&self.revisions, id)
    }

    /// Revisions of a branch, newest first. Ties keep insertion order reversed.
    pub fn revisions_newest_first(&self, branch_id: Id) -> Vec<&Revision> {
        let mut revs: Vec<&Revision> = self
            .revisions
            .iter()
            .filter(|r| r.branch_id == branch_id)
            .collect();
        revs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        revs
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Find the result for a (revision, executable, benchmark, environment) key.
    pub fn result_mut(
        &mut self,
        revision_id: Id,
        executable_id: Id,
        benchmark_id: Id,
        environment_id: Id,
    ) -> Option<&mut BenchmarkResult> {
        self.results.iter_mut().find(|r| {
            r.revision_id == revision_id
                && r.executable_id == executable_id
                && r.benchmark_id == benchmark_id
                && r.environment_id == environment_id
        })
    }

    pub fn insert_result(&mut self, make: impl FnOnce(Id) -> BenchmarkResult) -> Id {
        let id = next_id(self.results.len());
        self.results.push(make(id));
        id
    }

    /// Results of a revision for one executable and environment.
    pub fn results_for(
        &self,
        revision_id: Id,
        executable_id: Id,
        environment_id: Id,
    ) -> Vec<&BenchmarkResult> {
        self.results
            .iter()
            .filter(|r| {
                r.revision_id == revision_id
                    && r.executable_id == executable_id
                    && r.environment_id == environment_id
            })
            .collect()
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub fn report_mut(
        &mut self,
        revision_id: Id,
        executable_id: Id,
        environment_id: Id,
    ) -> Option<&mut Report> {
        self.reports.iter_mut().find(|r| {
            r.revision_id == revision_id
                && r.executable_id == executable_id
                && r.environment_id == environment_id
        })
    }

    pub fn insert_report(&mut self, report: Report) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}
