#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use snomed_tools::TransportError;
use snomed_tools::transport::{HttpRequest, HttpResponse, Transport};

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// Answers from a fixed script keyed by the `code` query parameter when one is
/// present, else by URL. Unknown keys get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Scripted>,
    pub calls: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, key: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            key.to_string(),
            Scripted::Respond(HttpResponse::new(status, body)),
        );
        self
    }

    pub fn fail(mut self, key: &str, message: &str) -> Self {
        self.routes
            .insert(key.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.borrow_mut().push(request.clone());
        let key = request
            .query_value("code")
            .map(str::to_string)
            .unwrap_or_else(|| request.url.clone());
        match self.routes.get(&key) {
            Some(Scripted::Respond(response)) => Ok(response.clone()),
            Some(Scripted::Fail(message)) => Err(TransportError::Request {
                url: request.url.clone(),
                message: message.clone(),
            }),
            None => Ok(HttpResponse::new(404, "not found")),
        }
    }
}

pub fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write input");
    path
}
