//! The library a fresh session starts with.

use crate::models::Node;

use super::NodeTree;

/// Folder that receives new knowledge unless another one is chosen.
pub const DEFAULT_FOLDER_ID: &str = "1-1";

pub fn initial_tree() -> NodeTree {
    NodeTree::new(vec![Node::folder(
        "1",
        "세계수",
        vec![
            Node::folder(
                "1-1",
                "철학",
                vec![
                    Node::file("1-1-1", "니체_차라투스트라는 이렇게 말했다.pdf"),
                    Node::memo(
                        "1-1-2",
                        "니체_차라투스트라는 이렇게 말했다_메모.txt",
                        "스스로를 넘어서는 존재에 대하여. 너는 무엇을 넘어서고 싶니?",
                    ),
                ],
            ),
            Node::folder(
                "1-2",
                "과학",
                vec![
                    Node::file("1-2-1", "코스모스.docx"),
                    Node::memo(
                        "1-2-2",
                        "코스모스_메모.txt",
                        "우리는 별의 먼지로 만들어졌다. 그 사실이 너에게는 어떻게 느껴지니?",
                    ),
                ],
            ),
            Node::folder(
                "1-3",
                "예술",
                vec![Node::folder(
                    "1-3-1",
                    "음악",
                    vec![
                        Node::file("1-3-1-1", "월광 소나타.txt"),
                        Node::memo(
                            "1-3-1-2",
                            "월광 소나타_메모.txt",
                            "말로 다 할 수 없는 슬픔이 소리가 되는 순간을 느껴보렴.",
                        ),
                    ],
                )],
            ),
        ],
    )])
}
