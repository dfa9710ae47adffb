//! In-process stand-in for a database server used by unit tests

use super::connection::{ConnectParams, ConnectionProvider, DriverError, SchemaConnection};
use super::provision::add_foreign_key_sql;
use crate::schema::ForeignKey;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Default)]
struct ServerState {
    refuse: Option<String>,
    fail_on: Option<(String, String)>,
    opened: Vec<ConnectParams>,
    closed: usize,
    statements: Vec<String>,
    foreign_keys: HashSet<String>,
}

/// Records every connection and statement. Adding the same foreign key twice
/// fails the way MySQL does.
#[derive(Clone, Default)]
pub(crate) struct FakeServer {
    state: Rc<RefCell<ServerState>>,
}

impl FakeServer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn provider(&self) -> FakeProvider {
        FakeProvider {
            server: self.clone(),
        }
    }

    pub(crate) fn refuse_connections(&self, message: &str) {
        self.state.borrow_mut().refuse = Some(message.to_string());
    }

    /// Fail the first statement containing `needle`
    pub(crate) fn fail_on(&self, needle: &str, message: &str) {
        self.state.borrow_mut().fail_on = Some((needle.to_string(), message.to_string()));
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.state.borrow().statements.clone()
    }

    pub(crate) fn connections(&self) -> Vec<ConnectParams> {
        self.state.borrow().opened.clone()
    }

    pub(crate) fn opened(&self) -> usize {
        self.state.borrow().opened.len()
    }

    pub(crate) fn closed(&self) -> usize {
        self.state.borrow().closed
    }
}

pub(crate) struct FakeProvider {
    server: FakeServer,
}

impl ConnectionProvider for FakeProvider {
    type Connection = FakeConnection;

    fn connect(&self, params: &ConnectParams) -> Result<FakeConnection, DriverError> {
        let mut state = self.server.state.borrow_mut();
        if let Some(message) = &state.refuse {
            return Err(message.clone().into());
        }
        state.opened.push(params.clone());
        Ok(FakeConnection {
            server: self.server.clone(),
        })
    }
}

pub(crate) struct FakeConnection {
    server: FakeServer,
}

impl SchemaConnection for FakeConnection {
    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        let mut state = self.server.state.borrow_mut();
        if let Some((needle, message)) = state.fail_on.clone() {
            if sql.contains(&needle) {
                state.fail_on = None;
                return Err(message.into());
            }
        }
        if sql.starts_with("ALTER TABLE") && !state.foreign_keys.insert(sql.to_string()) {
            return Err("Duplicate foreign key constraint name".into());
        }
        state.statements.push(sql.to_string());
        Ok(())
    }

    fn foreign_key_exists(&mut self, table: &str, fk: &ForeignKey) -> Result<bool, DriverError> {
        let sql = add_foreign_key_sql(table, fk);
        Ok(self.server.state.borrow().foreign_keys.contains(&sql))
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.server.state.borrow_mut().closed += 1;
    }
}
