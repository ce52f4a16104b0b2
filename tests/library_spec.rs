mod common;

use std::time::{Duration, Instant};

use chrono::Utc;
use common::{sample_tree, test_config, ScriptedGenerator, THREE_PART_REPLY};
use elysia_library::generation::ThoughtMode;
use elysia_library::library::*;
use elysia_library::models::Node;
use speculate2::speculate;

fn learn(state: &LibraryState, id: &str) -> Event {
    let node = state.tree().find(id).expect("node should exist").clone();
    let memo = state.tree().find_paired_note_content(&node);
    Event::CycleRequested {
        node,
        memo,
        mode: ThoughtMode::Learn,
    }
}

speculate! {
    before {
        let mut state = LibraryState::new(sample_tree());
    }

    describe "cycle requested" {
        it "enters Requesting and asks for a generation" {
            let effect = state.apply(learn(&state, "sein")).expect("cycle should start");

            assert_eq!(state.phase(), CyclePhase::Requesting(ThoughtMode::Learn));
            assert!(state.is_thinking());
            assert_eq!(state.selected().map(|n| n.id.as_str()), Some("sein"));
            match effect {
                Some(Effect::Generate { mode, prompt }) => {
                    assert_eq!(mode, ThoughtMode::Learn);
                    assert!(prompt.contains("'존재와시간.pdf'"));
                    assert!(prompt.contains("\"철학적 성찰\""));
                    assert!(prompt.contains("이제 막 세상을 배우기 시작했습니다"));
                }
                other => panic!("unexpected effect: {:?}", other),
            }
        }

        it "clears the previous result" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();

            state.apply(learn(&state, "tao")).unwrap();
            assert!(state.thought().is_none());
            assert!(state.inquiry().is_none());
            assert!(state.creation().is_none());
            assert!(state.pending_crystal().is_none());
        }

        it "declines a first exposure without a memo" {
            let node = state.tree().find("loose").unwrap().clone();
            let effect = state.apply(Event::CycleRequested {
                node,
                memo: None,
                mode: ThoughtMode::Learn,
            }).unwrap();

            assert!(effect.is_none());
            assert!(!state.is_thinking());
            assert_eq!(state.thought(), Some(CANNOT_LEARN_WITHOUT_MEMO));
            assert!(state.selected().is_none());
        }

        it "does not need a memo to forget" {
            let node = state.tree().find("loose").unwrap().clone();
            let effect = state.apply(Event::CycleRequested {
                node,
                memo: None,
                mode: ThoughtMode::Forget,
            }).unwrap();
            assert!(matches!(effect, Some(Effect::Generate { mode: ThoughtMode::Forget, .. })));
        }

        it "rejects a second trigger while one is in flight" {
            state.apply(learn(&state, "sein")).unwrap();
            let second = state.apply(learn(&state, "tao"));

            assert_eq!(second, Err(LibraryError::CycleInFlight));
            assert_eq!(state.selected().map(|n| n.id.as_str()), Some("sein"));
        }

        it "does not overwrite a running cycle with the missing-memo notice" {
            state.apply(learn(&state, "sein")).unwrap();
            let node = state.tree().find("loose").unwrap().clone();
            let result = state.apply(Event::CycleRequested {
                node,
                memo: None,
                mode: ThoughtMode::Learn,
            });

            assert_eq!(result, Err(LibraryError::CycleInFlight));
            assert!(state.thought().is_none());
            assert!(state.is_thinking());
        }

        it "lists integrated knowledge in the prompt" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();
            state.apply(Event::IntegrationRequested).unwrap();
            state.apply(Event::IntegrationCompleted).unwrap();

            match state.apply(learn(&state, "tao")).unwrap() {
                Some(Effect::Generate { prompt, .. }) => {
                    assert!(prompt.contains("통합했습니다: '존재와시간.pdf'"));
                }
                other => panic!("unexpected effect: {:?}", other),
            }
        }
    }

    describe "cycle completed" {
        it "parses a first-exposure reply into three fields" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();

            assert_eq!(state.phase(), CyclePhase::Idle);
            assert_eq!(state.thought(), Some("A"));
            assert_eq!(state.inquiry(), Some("B"));
            assert_eq!(state.creation(), Some("C"));
        }

        it "keeps archive replies whole" {
            let node = state.tree().find("sein").unwrap().clone();
            state.apply(Event::CycleRequested { node, memo: None, mode: ThoughtMode::Remember }).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();

            assert_eq!(state.thought(), Some(THREE_PART_REPLY));
            assert!(state.inquiry().is_none());
            assert!(state.creation().is_none());
        }

        it "turns a failure into the apology" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleFailed { reason: "timeout".to_string() }).unwrap();

            assert!(!state.is_thinking());
            assert_eq!(state.thought(), Some(CYCLE_FAILED));
            assert!(state.inquiry().is_none());
            assert!(state.creation().is_none());
        }

        it "rejects a reply when no cycle is running" {
            let result = state.apply(Event::CycleSucceeded { reply: "late".to_string() });
            assert_eq!(result, Err(LibraryError::NoCycleInFlight));
            assert!(state.thought().is_none());
        }
    }

    describe "crystallize" {
        it "requires a selection" {
            let result = state.apply(Event::CrystallizeRequested { at: Utc::now() });
            assert_eq!(result, Err(LibraryError::NoSelection));
        }

        it "is refused while thinking" {
            state.apply(learn(&state, "sein")).unwrap();
            let result = state.apply(Event::CrystallizeRequested { at: Utc::now() });
            assert_eq!(result, Err(LibraryError::CycleInFlight));
        }

        it "snapshots the result with the knowledge identity" {
            let at = Utc::now();
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at }).unwrap();

            let crystal = state.pending_crystal().expect("crystal should be pending");
            assert_eq!(crystal.timestamp, at);
            assert_eq!(crystal.knowledge.id, "sein");
            assert_eq!(crystal.knowledge.name, "존재와시간.pdf");
            assert_eq!(crystal.knowledge.memo.as_deref(), Some("철학적 성찰"));
            assert_eq!(crystal.elysia_process.thought, "A");
            assert_eq!(crystal.elysia_process.inquiry.as_deref(), Some("B"));
            assert_eq!(crystal.elysia_process.creation.as_deref(), Some("C"));
            assert!(state.history().is_empty());
        }
    }

    describe "integration" {
        it "requires a pending crystal" {
            assert_eq!(state.apply(Event::IntegrationRequested), Err(LibraryError::NoPendingCrystal));
            assert!(!state.is_integrating());
        }

        it "appends once and resets the cycle" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();

            let effect = state.apply(Event::IntegrationRequested).unwrap();
            assert_eq!(effect, Some(Effect::Integrate));
            assert!(state.is_integrating());
            assert_eq!(state.status(Instant::now()), Some(INTEGRATION_STARTED));

            state.apply(Event::IntegrationCompleted).unwrap();
            assert_eq!(state.history().len(), 1);
            assert!(state.selected().is_none());
            assert!(state.thought().is_none());
            assert!(state.inquiry().is_none());
            assert!(state.creation().is_none());
            assert!(state.pending_crystal().is_none());
            assert!(!state.is_integrating());
            assert!(state.integrated_ids().contains("sein"));

            assert_eq!(state.apply(Event::IntegrationRequested), Err(LibraryError::NoPendingCrystal));
            assert_eq!(state.apply(Event::IntegrationCompleted), Err(LibraryError::NoPendingCrystal));
            assert_eq!(state.history().len(), 1);
        }

        it "keeps the integrating crystal when a cycle is requested meanwhile" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();
            state.apply(Event::IntegrationRequested).unwrap();

            assert_eq!(state.apply(learn(&state, "tao")), Err(LibraryError::IntegrationInFlight));
            assert_eq!(
                state.apply(Event::CrystallizeRequested { at: Utc::now() }),
                Err(LibraryError::IntegrationInFlight)
            );
            assert_eq!(state.pending_crystal().map(|c| c.knowledge.id.as_str()), Some("sein"));

            state.apply(Event::IntegrationCompleted).unwrap();
            assert_eq!(state.history().len(), 1);
            assert!(!state.is_integrating());

            state.apply(learn(&state, "tao")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();
            assert_eq!(state.apply(Event::IntegrationRequested), Ok(Some(Effect::Integrate)));
        }

        it "rejects a second request while integrating" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();
            state.apply(Event::IntegrationRequested).unwrap();

            assert_eq!(state.apply(Event::IntegrationRequested), Err(LibraryError::IntegrationInFlight));
        }

        it "posts a completion status that expires" {
            state.apply(learn(&state, "sein")).unwrap();
            state.apply(Event::CycleSucceeded { reply: THREE_PART_REPLY.to_string() }).unwrap();
            state.apply(Event::CrystallizeRequested { at: Utc::now() }).unwrap();
            state.apply(Event::IntegrationRequested).unwrap();
            state.apply(Event::IntegrationCompleted).unwrap();

            let status = state.status(Instant::now()).expect("status should be posted");
            assert!(status.contains("'존재와시간.pdf'에 대한 경험"));
            assert!(state.status(Instant::now() + Duration::from_secs(5)).is_none());
        }
    }

    describe "archive set" {
        it "flags the file and memo and posts a status" {
            let leaf = state.tree().find("sein").unwrap().clone();
            state.apply(Event::ArchiveSet { leaf, archived: true }).unwrap();

            assert!(state.tree().find("sein").unwrap().is_archived());
            assert!(state.tree().find("sein-memo").unwrap().is_archived());
            let status = state.status(Instant::now()).unwrap();
            assert!(status.contains("기억의 심연으로 옮겨졌습니다"));
        }

        it "closes the abyss on restore" {
            state.apply(Event::AbyssOpened).unwrap();
            let leaf = state.tree().find("sein").unwrap().clone();
            state.apply(Event::ArchiveSet { leaf: leaf.clone(), archived: true }).unwrap();
            assert!(state.is_abyss_open());

            state.apply(Event::ArchiveSet { leaf, archived: false }).unwrap();
            assert!(!state.is_abyss_open());
            assert!(!state.tree().find("sein").unwrap().is_archived());
        }
    }

    describe "driver" {
        it "learns a nested file through its memo" {
            let mut library = Library::new(
                state.clone(),
                ScriptedGenerator::replying(&[THREE_PART_REPLY]),
                &test_config(),
            );
            tokio_test::block_on(library.select("tao")).unwrap();

            assert_eq!(library.state().inquiry(), Some("B"));
            assert!(library.generator().requests()[0].prompt.contains("\"무위\""));
        }
    }

    describe "knowledge added" {
        it "stores the file and memo side by side" {
            state.apply(Event::KnowledgeAdded {
                folder_id: "sci".to_string(),
                file: Node::file("f", "코스모스.txt"),
                memo: Node::memo("m", "코스모스_메모.txt", "별의 먼지"),
            }).unwrap();

            let file = state.tree().find("f").unwrap().clone();
            assert_eq!(state.tree().find_paired_note_content(&file).as_deref(), Some("별의 먼지"));
        }
    }
}

mod driver {
    use super::*;

    fn library(generator: ScriptedGenerator) -> Library<ScriptedGenerator> {
        Library::new(LibraryState::new(sample_tree()), generator, &test_config())
    }

    #[tokio::test]
    async fn runs_the_whole_cycle_end_to_end() {
        let mut library = library(ScriptedGenerator::replying(&[THREE_PART_REPLY]));

        library.select("sein").await.expect("select should succeed");
        let state = library.state();
        assert!(!state.is_thinking());
        assert_eq!(state.thought(), Some("A"));
        assert_eq!(state.inquiry(), Some("B"));
        assert_eq!(state.creation(), Some("C"));

        let crystal = library.crystallize().expect("crystallize should succeed").clone();
        assert_eq!(crystal.knowledge.id, "sein");
        assert_eq!(crystal.elysia_process.creation.as_deref(), Some("C"));

        library.integrate().await.expect("integrate should succeed");
        let state = library.state();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0], crystal);
        assert!(state.selected().is_none());
        assert!(state.thought().is_none());
        assert!(state.inquiry().is_none());
        assert!(state.creation().is_none());
    }

    #[tokio::test]
    async fn sends_the_configured_model() {
        let mut library = library(ScriptedGenerator::replying(&["사유: 생각"]));
        library.select("sein").await.unwrap();

        let requests = library.generator().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn publishes_the_apology_on_failure() {
        let mut library = library(ScriptedGenerator::failing());
        library.select("sein").await.unwrap();

        assert_eq!(library.state().thought(), Some(CYCLE_FAILED));
        assert!(!library.state().is_thinking());
    }

    #[tokio::test]
    async fn learns_a_file_without_memo_from_the_sentinel() {
        let mut library = library(ScriptedGenerator::replying(&["사유: 빈 메모"]));
        library.select("bare").await.unwrap();

        let requests = library.generator().requests();
        assert!(requests[0].prompt.contains(elysia_library::tree::MEMO_NOT_FOUND));
    }

    #[tokio::test]
    async fn declines_a_root_level_file_without_calling_out() {
        let mut library = library(ScriptedGenerator::replying(&["unused"]));
        library.select("loose").await.unwrap();

        assert!(library.generator().requests().is_empty());
        assert_eq!(library.state().thought(), Some(CANNOT_LEARN_WITHOUT_MEMO));
    }

    #[tokio::test]
    async fn rejects_folders_and_memos() {
        let mut library = library(ScriptedGenerator::default());
        assert_eq!(library.select("phil").await, Err(LibraryError::NotAFile("phil".to_string())));
        assert_eq!(library.select("sein-memo").await, Err(LibraryError::NotAFile("sein-memo".to_string())));
        assert_eq!(library.select("ghost").await, Err(LibraryError::NodeNotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn archives_after_confirmation_and_forgets() {
        let mut library = library(ScriptedGenerator::replying(&["놓아줄게요."]));
        let asked = std::cell::Cell::new(false);
        let confirm = |question: &str| {
            asked.set(question == ARCHIVE_QUESTION);
            true
        };

        assert!(library.archive("sein", &confirm).await.unwrap());
        assert!(asked.get());

        let state = library.state();
        assert!(state.tree().find("sein").unwrap().is_archived());
        assert!(state.tree().find("sein-memo").unwrap().is_archived());
        assert_eq!(state.thought(), Some("놓아줄게요."));
        assert!(library.generator().requests()[0].prompt.contains("'잊음'"));
    }

    #[tokio::test]
    async fn declined_archive_changes_nothing() {
        let mut library = library(ScriptedGenerator::default());
        let before = library.state().tree().clone();

        assert!(!library.archive("sein", &|_: &str| false).await.unwrap());
        assert_eq!(library.state().tree(), &before);
        assert!(library.generator().requests().is_empty());
        assert!(library.state().status(Instant::now()).is_none());
    }

    #[tokio::test]
    async fn archives_a_file_without_memo() {
        let mut library = library(ScriptedGenerator::replying(&["안녕."]));
        assert!(library.archive("bare", &|_: &str| true).await.unwrap());
        assert!(library.state().tree().find("bare").unwrap().is_archived());
    }

    #[tokio::test]
    async fn restores_and_closes_the_abyss() {
        let mut library = library(ScriptedGenerator::replying(&["잊음", "다시 만났네요."]));
        library.archive("tao", &|_: &str| true).await.unwrap();

        let archived = library.open_abyss();
        assert_eq!(archived.len(), 1);
        assert!(library.state().is_abyss_open());

        library.restore("tao").await.unwrap();
        let state = library.state();
        assert!(!state.is_abyss_open());
        assert!(!state.tree().find("tao").unwrap().is_archived());
        assert!(!state.tree().find("tao-memo").unwrap().is_archived());
        assert_eq!(state.thought(), Some("다시 만났네요."));
        assert!(library.generator().requests()[1].prompt.contains("'기억'의 과정"));
    }

    #[tokio::test]
    async fn archived_files_cannot_be_selected_or_archived_again() {
        let mut library = library(ScriptedGenerator::replying(&["잊음"]));
        library.archive("sein", &|_: &str| true).await.unwrap();

        assert_eq!(library.select("sein").await, Err(LibraryError::Archived("sein".to_string())));
        assert_eq!(
            library.archive("sein", &|_: &str| true).await,
            Err(LibraryError::Archived("sein".to_string()))
        );
        assert_eq!(library.generator().requests().len(), 1);
    }

    #[tokio::test]
    async fn only_archived_files_can_be_restored() {
        let mut library = library(ScriptedGenerator::default());
        let before = library.state().tree().clone();

        assert_eq!(library.restore("sein").await, Err(LibraryError::NotArchived("sein".to_string())));
        assert_eq!(library.state().tree(), &before);
        assert!(library.generator().requests().is_empty());
        assert!(library.state().status(Instant::now()).is_none());
    }

    #[tokio::test]
    async fn adds_knowledge_and_learns_it() {
        let mut library = library(ScriptedGenerator::replying(&[THREE_PART_REPLY]));
        let file = library
            .add_knowledge("sci", "코스모스.docx", "별의 먼지")
            .await
            .unwrap();

        let state = library.state();
        assert_eq!(state.tree().find_container_of(&file.id).map(|n| n.id.as_str()), Some("sci"));
        assert_eq!(state.tree().find_paired_note_content(&file).as_deref(), Some("별의 먼지"));
        assert_eq!(state.selected().map(|n| n.id.as_str()), Some(file.id.as_str()));
        assert_eq!(state.creation(), Some("C"));
        assert!(state.status(Instant::now()).unwrap().contains("세계수에 추가되었습니다"));
    }

    #[tokio::test]
    async fn rejects_blank_inputs_when_adding() {
        let mut library = library(ScriptedGenerator::default());
        assert_eq!(
            library.add_knowledge("sci", "  ", "memo").await,
            Err(LibraryError::EmptyField("file name"))
        );
        assert_eq!(
            library.add_knowledge("sci", "a.txt", "\n").await,
            Err(LibraryError::EmptyField("memo"))
        );
        assert!(library.state().tree().find("sci").unwrap().children().is_empty());
    }

    #[tokio::test]
    async fn integrate_without_crystal_is_refused() {
        let mut library = library(ScriptedGenerator::replying(&[THREE_PART_REPLY]));
        library.select("sein").await.unwrap();
        assert_eq!(library.integrate().await, Err(LibraryError::NoPendingCrystal));
        assert!(library.state().history().is_empty());
    }

    #[tokio::test]
    async fn integration_waits_for_the_configured_delay() {
        let config = elysia_library::config::AppConfig {
            integration_delay_ms: 30,
            ..test_config()
        };
        let mut library = Library::new(
            LibraryState::new(sample_tree()),
            ScriptedGenerator::replying(&[THREE_PART_REPLY]),
            &config,
        );
        library.select("sein").await.unwrap();
        library.crystallize().unwrap();

        let started = Instant::now();
        library.integrate().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(library.state().history().len(), 1);
    }
}
