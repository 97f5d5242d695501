#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use mlbb_terminal::api::ApiSource;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

enum Reply {
    Body(String),
    Delayed(Duration, String),
    Fail(String),
}

/// In-memory stand-in for the stats host: each path serves its queued
/// replies in order, the last one repeating.
#[derive(Default)]
pub struct MockApi {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, path: impl Into<String>, body: impl Into<String>) -> &Self {
        self.push(path.into(), Reply::Body(body.into()))
    }

    pub fn serve_after(
        &self,
        path: impl Into<String>,
        delay: Duration,
        body: impl Into<String>,
    ) -> &Self {
        self.push(path.into(), Reply::Delayed(delay, body.into()))
    }

    pub fn fail(&self, path: impl Into<String>, msg: impl Into<String>) -> &Self {
        self.push(path.into(), Reply::Fail(msg.into()))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }

    fn push(&self, path: String, reply: Reply) -> &Self {
        self.replies
            .lock()
            .expect("replies lock")
            .entry(path)
            .or_default()
            .push_back(reply);
        self
    }
}

impl ApiSource for MockApi {
    fn get(&self, path: &str) -> Result<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(path.to_string());

        let reply = {
            let mut replies = self.replies.lock().expect("replies lock");
            let Some(queue) = replies.get_mut(path) else {
                return Err(anyhow::anyhow!("http 404 Not Found: {path}"));
            };
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().map(|reply| match reply {
                    Reply::Body(body) => Reply::Body(body.clone()),
                    Reply::Delayed(delay, body) => Reply::Delayed(*delay, body.clone()),
                    Reply::Fail(msg) => Reply::Fail(msg.clone()),
                })
            }
        };

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Delayed(delay, body)) => {
                thread::sleep(delay);
                Ok(body)
            }
            Some(Reply::Fail(msg)) => Err(anyhow::anyhow!(msg)),
            None => Err(anyhow::anyhow!("no reply queued for {path}")),
        }
    }
}

/// A hero-position page body with `count` records named `{prefix}{n}`.
pub fn position_page(prefix: &str, start: usize, count: usize) -> String {
    let records = (start..start + count)
        .map(|n| {
            format!(
                r#"{{"data":{{"hero":{{"data":{{"name":"{prefix}{n}","smallmap":"https://img/{prefix}{n}.png"}}}}}}}}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"code":0,"data":{{"records":[{records}],"total":{count}}}}}"#)
}
