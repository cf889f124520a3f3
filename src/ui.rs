use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use engine::constant::BOARD_SIZE;
use engine::{Game, Position};
use regex::Regex;
use tracing::debug;

pub fn ui(game: Game) -> anyhow::Result<()> {
    let stdin = io::stdin();
    Ui::new(game, stdin.lock(), io::stdout())?.run()
}

#[derive(Debug, PartialEq)]
enum Command {
    Click(i32, i32),
    Reset,
    Quit,
    Unknown,
}

pub struct Ui<R, W> {
    game: Game,
    input: R,
    output: W,
    click: Regex,
}

impl<R: BufRead, W: Write> Ui<R, W> {
    pub fn new(game: Game, input: R, output: W) -> anyhow::Result<Self> {
        Ok(Ui {
            game,
            input,
            output,
            click: Regex::new(r"^(?P<row>[0-9])\s*[,\s]\s*(?P<col>[0-9])$")?,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.redrawn(&BTreeSet::new())?;
        loop {
            write!(self.output, "{} to move> ", self.game.current_turn())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            match self.parse(&line) {
                Command::Quit => break,
                Command::Reset => {
                    self.game.reset();
                    self.redrawn(&BTreeSet::new())?;
                }
                Command::Click(row, col) => {
                    if !self.handle_square_click(row, col)? {
                        break;
                    }
                }
                Command::Unknown => {
                    writeln!(self.output, "enter `<row> <col>` to click a square, `reset` or `quit`")?;
                }
            }
        }
        Ok(())
    }

    fn parse(&self, line: &str) -> Command {
        let line = line.trim();
        match line {
            "quit" | "q" => return Command::Quit,
            "reset" => return Command::Reset,
            _ => {}
        }
        match self.click.captures(line) {
            Some(caps) => {
                // 单个数字，一定能解析
                let row = caps["row"].parse().unwrap_or(-1);
                let col = caps["col"].parse().unwrap_or(-1);
                Command::Click(row, col)
            }
            None => Command::Unknown,
        }
    }

    // 返回 false 表示玩家不再继续
    fn handle_square_click(&mut self, row: i32, col: i32) -> anyhow::Result<bool> {
        let moved = self.game.handle_square_selection(row, col)?;
        debug!(row, col, moved, "square clicked");
        if moved {
            self.redrawn(&BTreeSet::new())?;
            return self.check_game_state();
        }

        // 选中了棋子就高亮它能走的格子
        let highlights = match self.game.selected() {
            Some(pos) => self.game.legal_moves_for(pos),
            None => BTreeSet::new(),
        };
        self.redrawn(&highlights)?;
        Ok(true)
    }

    fn check_game_state(&mut self) -> anyhow::Result<bool> {
        let color = self.game.current_turn();
        if self.game.is_in_check(color)? {
            writeln!(self.output, "{} is in check.", color)?;
        }
        if !self.game.is_checkmate(color)? {
            return Ok(true);
        }

        write!(self.output, "Checkmate! Would you like to play again? [y/n] ")?;
        self.output.flush()?;
        let again = self
            .read_line()?
            .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y"));
        if again {
            self.game.reset();
            self.redrawn(&BTreeSet::new())?;
        }
        Ok(again)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn redrawn(&mut self, highlights: &BTreeSet<Position>) -> io::Result<()> {
        let text = render(&self.game, highlights);
        self.output.write_all(text.as_bytes())
    }
}

/// Text picture of the board: uppercase White, lowercase Black, `.`/`:` for
/// light/dark squares, `*` for an empty highlighted square and brackets
/// around a highlighted capture.
pub fn render(game: &Game, highlights: &BTreeSet<Position>) -> String {
    let mut out = String::from("   ");
    for col in 0..BOARD_SIZE {
        out.push_str(&format!(" {} ", col));
    }
    out.push('\n');

    for row in 0..BOARD_SIZE {
        out.push_str(&format!(" {} ", row));
        for col in 0..BOARD_SIZE {
            let highlighted = highlights.contains(&Position::new(row, col));
            let cell = match (game.piece_at(row, col), highlighted) {
                (Some(piece), true) => format!("[{}]", piece.symbol()),
                (Some(piece), false) => format!(" {} ", piece.symbol()),
                (None, true) => " * ".to_string(),
                (None, false) if (row + col) % 2 == 0 => " . ".to_string(),
                (None, false) => " : ".to_string(),
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}
