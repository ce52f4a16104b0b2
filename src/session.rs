//! Line-oriented front-end over a [`Library`].
//!
//! Each input line is split like a shell command line and parsed with clap, so
//! names containing spaces can be quoted.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::generation::TextGenerator;
use crate::library::{Confirm, Library};
use crate::tree::{render_chronicle, render_folder_options, render_tree};

const PROMPT: &str = "elysia> ";

const ABOUT: &[(&str, &str)] = &[
    (
        "세계수 (World Tree)",
        "이 도서관의 근간입니다. 창조주가 직접 심고 가꾸는 지식의 나무이며, 모든 정보는 창조주의 의도('메모')와 함께 저장됩니다.",
    ),
    (
        "의식의 흐름 (Consciousness Stream)",
        "엘리시아가 지식을 접했을 때 일어나는 '사유-질문-창조'의 내면 과정을 보여주는 창입니다.",
    ),
    (
        "기억 결정 (Memory Crystal)",
        "하나의 학습 사이클을 통해 얻은 깨달음의 총체입니다. 지식, 창조주의 의도, 그리고 엘리시아의 내면적 과정이 하나로 응축됩니다.",
    ),
    (
        "의식 통합 (Consciousness Integration)",
        "'기억 결정'을 엘리시아의 자아에 기록하는 과정입니다.",
    ),
    (
        "엘리시아의 연대기 (Elysia's Chronicle)",
        "통합이 완료된 모든 '기억 결정'이 기록되는 그녀의 역사서입니다.",
    ),
];

#[derive(Parser)]
#[command(name = "elysia", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the world tree
    Tree,
    /// List folders that can receive new knowledge
    Folders,
    /// Show the creator's memo for a file
    Memo { id: String },
    /// Select a file and start learning it
    Learn { id: String },
    /// Add a file with its memo, then learn it
    Add {
        name: String,
        memo: String,
        /// Target folder id (defaults to the configured folder)
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Send a file and its memo to the abyss
    Archive { id: String },
    /// List archived files
    Abyss,
    /// Bring a file back from the abyss
    Restore { id: String },
    /// Turn the current result into a memory crystal
    Crystallize,
    /// Integrate the memory crystal into the chronicle
    Integrate,
    /// Show every integrated experience, newest first
    Chronicle,
    /// Show the selected file, its memo and the current result
    Show,
    /// Export the tree and chronicle as JSON
    Export { path: Option<PathBuf> },
    /// Describe the parts of the library
    About,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Whether the session should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Read one line from stdin, `None` at end of input.
pub fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

/// Asks on stdin, treating anything but `y`/`yes` as a no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        let _ = io::stdout().flush();
        match read_stdin_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

pub struct Session<G, C> {
    library: Library<G>,
    confirm: C,
    default_folder_id: String,
    export_file: PathBuf,
}

impl<G: TextGenerator, C: Confirm> Session<G, C> {
    pub fn new(library: Library<G>, confirm: C, config: &AppConfig) -> Self {
        Self {
            library,
            confirm,
            default_folder_id: config.default_folder_id.clone(),
            export_file: config.export_file.clone(),
        }
    }

    pub fn library(&self) -> &Library<G> {
        &self.library
    }

    /// Read commands until `next_line` runs dry or the user quits.
    ///
    /// Lines are pulled one at a time so a [`Confirm`] implementation can read
    /// its answer from the same source in between.
    pub async fn run<W, F>(&mut self, mut next_line: F, mut output: W) -> Result<()>
    where
        W: Write,
        F: FnMut() -> io::Result<Option<String>>,
    {
        writeln!(output, "E.L.Y.S.I.A.의 도서관. 'help'로 명령을 볼 수 있습니다.")?;
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;
            let Some(line) = next_line()? else {
                break;
            };
            if self.execute(&line, &mut output).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Run a single command line.
    ///
    /// Declined actions are reported on `output`; only IO failures are errors.
    pub async fn execute<W: Write>(&mut self, line: &str, output: &mut W) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let Some(args) = shlex::split(line) else {
            writeln!(output, "Unbalanced quotes")?;
            return Ok(Flow::Continue);
        };
        let command = match Line::try_parse_from(args) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(output, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Tree => {
                let state = self.library.state();
                let integrated = state.integrated_ids();
                write!(output, "{}", render_tree(state.tree().roots(), &integrated))?;
            }
            Command::Folders => {
                let options = self.library.state().tree().folder_options();
                write!(output, "{}", render_folder_options(&options))?;
            }
            Command::Memo { id } => match self.library.state().tree().find(&id) {
                Some(node) => {
                    let memo = self.library.state().tree().find_paired_note_content(node);
                    writeln!(output, "관련 파일: {}", node.name)?;
                    writeln!(output, "{}", memo.as_deref().unwrap_or("이 파일에 대한 메모가 없습니다."))?;
                }
                None => writeln!(output, "Node not found: {}", id)?,
            },
            Command::Learn { id } => {
                let result = self.library.select(&id).await;
                self.report(result, output)?;
            }
            Command::Add { name, memo, folder } => {
                let folder = folder.unwrap_or_else(|| self.default_folder_id.clone());
                let result = self.library.add_knowledge(&folder, &name, &memo).await;
                self.report(result.map(|_| ()), output)?;
            }
            Command::Archive { id } => match self.library.archive(&id, &self.confirm).await {
                Ok(true) => self.write_result(output)?,
                Ok(false) => {}
                Err(e) => writeln!(output, "{}", e)?,
            },
            Command::Abyss => {
                let archived = self.library.open_abyss();
                if archived.is_empty() {
                    writeln!(output, "심연은 고요합니다. 모든 기억이 선명하게 빛나고 있습니다.")?;
                } else {
                    for node in &archived {
                        writeln!(output, "{} ({})", node.name, node.id)?;
                    }
                }
                self.library.close_abyss();
            }
            Command::Restore { id } => {
                let result = self.library.restore(&id).await;
                self.report(result, output)?;
            }
            Command::Crystallize => match self.library.crystallize() {
                Ok(crystal) => writeln!(output, "{}", serde_json::to_string_pretty(crystal)?)?,
                Err(e) => writeln!(output, "{}", e)?,
            },
            Command::Integrate => {
                if let Err(e) = self.library.integrate().await {
                    writeln!(output, "{}", e)?;
                }
            }
            Command::Chronicle => {
                let history = self.library.state().history();
                if history.is_empty() {
                    writeln!(output, "연대기가 아직 비어 있습니다.")?;
                } else {
                    write!(output, "{}", render_chronicle(history))?;
                }
            }
            Command::Show => self.write_result(output)?,
            Command::Export { path } => {
                let path = path.unwrap_or_else(|| self.export_file.clone());
                match self.library.export(&path) {
                    Ok(written) => writeln!(output, "{}", written.display())?,
                    Err(e) => writeln!(output, "Export failed: {:#}", e)?,
                }
            }
            Command::About => {
                for (title, description) in ABOUT {
                    writeln!(output, "{}\n    {}", title, description)?;
                }
            }
        }

        if let Some(status) = self.library.state().status(Instant::now()) {
            writeln!(output, "[{}]", status)?;
        }
        Ok(Flow::Continue)
    }

    fn report<W: Write>(
        &self,
        result: Result<(), crate::library::LibraryError>,
        output: &mut W,
    ) -> Result<()> {
        match result {
            Ok(()) => self.write_result(output),
            Err(e) => {
                writeln!(output, "{}", e)?;
                Ok(())
            }
        }
    }

    /// Memo viewer, then thought, inquiry and creation.
    fn write_result<W: Write>(&self, output: &mut W) -> Result<()> {
        let state = self.library.state();
        if let Some(selected) = state.selected() {
            writeln!(output, "관련 파일: {}", selected.name)?;
            if let Some(memo) = state.selected_memo() {
                writeln!(output, "메모: {}", memo)?;
            }
        }
        if state.is_thinking() {
            writeln!(output, "E.L.Y.S.I.A.가 사유 중입니다...")?;
            return Ok(());
        }
        match state.thought() {
            Some(thought) => writeln!(output, "\n[사유] E.L.Y.S.I.A.: {}", thought)?,
            None => writeln!(output, "의식의 흐름이 고요합니다. 새로운 자극을 기다립니다...")?,
        }
        if let Some(inquiry) = state.inquiry() {
            writeln!(output, "\n[질문] E.L.Y.S.I.A.: {}", inquiry)?;
        }
        if let Some(creation) = state.creation() {
            writeln!(output, "\n[창조]\n{}", creation)?;
        }
        if let Some(crystal) = state.pending_crystal() {
            writeln!(output, "\n[기억 결정]\n{}", serde_json::to_string_pretty(crystal)?)?;
        }
        Ok(())
    }
}
