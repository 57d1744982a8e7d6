//! 省级进度上报与 CLI 进度条。
//!
//! 每个省份一个 `ProgressReporter`，只在该省遍历期间存在。
//! 渲染由 `ProgressSink` 完成：交互终端用 indicatif 原地刷新同一行，
//! 非交互输出（重定向、CI）每推进一次打印一行。

use std::fmt::Write as _;
use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

pub const BAR_WIDTH: usize = 30;

const FILLED: char = '█';
const EMPTY: char = '░';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// 四舍五入后的百分比。
    pub fn percent(&self) -> u64 {
        (self.ratio() * 100.0).round() as u64
    }

    pub fn filled(&self, width: usize) -> usize {
        ((width as f64 * self.ratio()).round() as usize).min(width)
    }

    pub fn bar(&self, width: usize) -> String {
        let filled = self.filled(width);
        let mut out = String::with_capacity(width * FILLED.len_utf8());
        out.extend(std::iter::repeat_n(FILLED, filled));
        out.extend(std::iter::repeat_n(EMPTY, width - filled));
        out
    }
}

/// 不带颜色的单行进度文本。
pub fn render_line(name: &str, state: &ProgressState, item: &str) -> String {
    let mut line = format!(
        "♦ {name} {} {}% ({}/{})",
        state.bar(BAR_WIDTH),
        state.percent(),
        state.completed,
        state.total
    );
    if !item.is_empty() {
        let _ = write!(line, " {item}");
    }
    line
}

pub trait ProgressSink {
    fn render(&mut self, name: &str, state: &ProgressState, item: &str);

    /// 在进度输出之间插入一行普通消息（例如单项失败）。
    fn message(&mut self, line: &str);

    fn finish(&mut self);
}

/// 测试中记录的每一帧：推进后的状态与当前条目。
#[cfg(test)]
pub(crate) type Frames = std::sync::Arc<std::sync::Mutex<Vec<(ProgressState, String)>>>;

#[derive(Debug, Clone)]
pub enum ProgressMode {
    Terminal,
    Plain,
    /// 所有省份的帧依次追加到同一个列表
    #[cfg(test)]
    Recording(Frames),
}

impl ProgressMode {
    pub fn detect(force_plain: bool) -> Self {
        if force_plain || !std::io::stdout().is_terminal() {
            ProgressMode::Plain
        } else {
            ProgressMode::Terminal
        }
    }

    pub fn make_sink(&self, name: &str, total: usize) -> Box<dyn ProgressSink> {
        match self {
            ProgressMode::Terminal => Box::new(TerminalSink::new(name, total)),
            ProgressMode::Plain => Box::new(PlainSink),
            #[cfg(test)]
            ProgressMode::Recording(frames) => Box::new(RecordingSink {
                frames: frames.clone(),
            }),
        }
    }
}

fn state_of(s: &indicatif::ProgressState) -> ProgressState {
    ProgressState {
        completed: s.pos() as usize,
        total: s.len().unwrap_or(0) as usize,
    }
}

struct TerminalSink {
    bar: ProgressBar,
}

impl TerminalSink {
    fn new(name: &str, total: usize) -> Self {
        let style = ProgressStyle::with_template(
            "♦ {prefix:.bold} {cells:.cyan} {pct:.yellow} ({pos}/{len}) {msg:.dim}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "cells",
            |s: &indicatif::ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = w.write_str(&state_of(s).bar(BAR_WIDTH));
            },
        )
        .with_key(
            "pct",
            |s: &indicatif::ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{}%", state_of(s).percent());
            },
        );

        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stdout());
        bar.set_style(style);
        bar.set_prefix(name.to_string());
        Self { bar }
    }
}

impl ProgressSink for TerminalSink {
    fn render(&mut self, _name: &str, state: &ProgressState, item: &str) {
        self.bar.set_message(item.to_string());
        self.bar.set_position(state.completed as u64);
    }

    fn message(&mut self, line: &str) {
        self.bar.println(line);
    }

    fn finish(&mut self) {
        // finish() 以最终状态重绘并换行
        self.bar.finish();
    }
}

struct PlainSink;

impl ProgressSink for PlainSink {
    fn render(&mut self, name: &str, state: &ProgressState, item: &str) {
        let line = render_line(name, state, item);
        info!(target: "progress", "{line}");
        println!("{line}");
    }

    fn message(&mut self, line: &str) {
        println!("{line}");
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
struct RecordingSink {
    frames: Frames,
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn render(&mut self, _name: &str, state: &ProgressState, item: &str) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push((*state, item.to_string()));
        }
    }

    fn message(&mut self, _line: &str) {}

    fn finish(&mut self) {}
}

pub(crate) struct ProgressReporter {
    name: String,
    state: ProgressState,
    sink: Box<dyn ProgressSink>,
}

impl ProgressReporter {
    pub(crate) fn new(name: &str, total: usize, sink: Box<dyn ProgressSink>) -> Self {
        Self {
            name: name.to_string(),
            state: ProgressState::new(total),
            sink,
        }
    }

    /// 完成一项（无论成功失败）后调用一次。
    pub(crate) fn advance(&mut self, item: &str) {
        self.state.completed += 1;
        self.sink.render(&self.name, &self.state, item);
    }

    pub(crate) fn message(&mut self, line: &str) {
        self.sink.message(line);
    }

    pub(crate) fn finish(mut self) -> ProgressState {
        self.sink.finish();
        self.state
    }
}
