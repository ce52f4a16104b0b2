#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use elysia_library::config::AppConfig;
use elysia_library::generation::{GenerationError, GenerationRequest, TextGenerator};
use elysia_library::models::Node;
use elysia_library::tree::NodeTree;

pub const THREE_PART_REPLY: &str = "사유: A\n---질문---\nB\n---창조---\nC";

/// What the scripted generator answers with next.
pub enum Scripted {
    Reply(String),
    Fail,
}

/// A generator that replays canned answers and records every request.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(replies: &[&str]) -> Self {
        let generator = Self::default();
        for reply in replies {
            generator.push(Scripted::Reply(reply.to_string()));
        }
        generator
    }

    pub fn failing() -> Self {
        let generator = Self::default();
        generator.push(Scripted::Fail);
        generator
    }

    pub fn push(&self, answer: Scripted) {
        self.script.lock().unwrap().push_back(answer);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail) => Err(GenerationError::Server("503: unavailable".to_string())),
            None => Err(GenerationError::EmptyReply),
        }
    }
}

/// Config with no integration wait.
pub fn test_config() -> AppConfig {
    AppConfig {
        integration_delay_ms: 0,
        ..AppConfig::default()
    }
}

/// ```text
/// 도서관 (root)
/// ├── 철학 (phil)
/// │   ├── 존재와시간.pdf (sein)            memo: 존재와시간_메모.txt = "철학적 성찰"
/// │   ├── 메모없는책.txt (bare)
/// │   └── 동양 (east)
/// │       └── 도덕경.v2.txt (tao)          memo: 도덕경_메모.txt = "무위"
/// └── 과학 (sci)
/// 떠도는.txt (loose)                        root-level file
/// ```
pub fn sample_tree() -> NodeTree {
    NodeTree::new(vec![
        Node::folder(
            "root",
            "도서관",
            vec![
                Node::folder(
                    "phil",
                    "철학",
                    vec![
                        Node::file("sein", "존재와시간.pdf"),
                        Node::memo("sein-memo", "존재와시간_메모.txt", "철학적 성찰"),
                        Node::file("bare", "메모없는책.txt"),
                        Node::folder(
                            "east",
                            "동양",
                            vec![
                                Node::file("tao", "도덕경.v2.txt"),
                                Node::memo("tao-memo", "도덕경_메모.txt", "무위"),
                            ],
                        ),
                    ],
                ),
                Node::folder("sci", "과학", vec![]),
            ],
        ),
        Node::file("loose", "떠도는.txt"),
    ])
}
