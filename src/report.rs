use boolsieve::{CompileError, ConditionError, MatchRun, Matcher};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            self.wrap(s.as_ref(), color)
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), DIM)
        }

        fn wrap(&self, s: &str, code: &str) -> String {
            if self.enabled { format!("{code}{s}{RESET}") } else { s.to_string() }
        }
    }
}

const PREVIEW_CHARS: usize = 80;

pub fn print_run(matcher: &Matcher, input: &str, run: &MatchRun, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: {:?}", preview(input)), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Compiled ━━━", ansi::GRAY));
    print_stats(matcher, &palette);

    println!("\n{}", palette.paint("━━━ Matches ━━━", ansi::GRAY));
    if run.indices.is_empty() {
        println!("{}", palette.dim("  No condition matched"));
    } else {
        for &index in &run.indices {
            print_condition(matcher, index, &palette);
        }
    }

    if !matcher.negatives().is_empty() {
        println!("\n{}", palette.paint("━━━ Negative-only (visited on every input) ━━━", ansi::GRAY));
        for &index in matcher.negatives() {
            print_condition(matcher, index, &palette);
        }
    }

    let metrics = &run.metrics;
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Scan: {}  │  Traversal: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", metrics.scan), ansi::CYAN),
        palette.dim(format!("{:?}", metrics.traversal)),
    );
    println!(
        "  {} {}  {} {}",
        palette.dim("literals present:"),
        palette.paint(metrics.literals_present.to_string(), ansi::YELLOW),
        palette.dim("│ nodes visited:"),
        palette.paint(metrics.nodes_visited.to_string(), ansi::YELLOW),
    );
    println!();
}

fn print_stats(matcher: &Matcher, palette: &ansi::Palette) {
    let stats = matcher.stats();
    println!(
        "  {} {}  {}  {} {}  {} {}",
        palette.paint(stats.conditions.to_string(), ansi::BLUE),
        palette.dim("conditions"),
        palette.dim(format!("({} empty)", stats.empty)),
        palette.paint(stats.literals.to_string(), ansi::BLUE),
        palette.dim("literals"),
        palette.paint(stats.and_paths.to_string(), ansi::BLUE),
        palette.dim("AND-paths"),
    );
    println!(
        "  {} {}  {} {}  {} {}",
        palette.paint(stats.patterns.to_string(), ansi::BLUE),
        palette.dim("patterns"),
        palette.paint(stats.automaton_states.to_string(), ansi::BLUE),
        palette.dim("automaton states"),
        palette.paint(stats.tree_nodes.to_string(), ansi::BLUE),
        palette.dim("tree nodes"),
    );
}

fn print_condition(matcher: &Matcher, index: usize, palette: &ansi::Palette) {
    let text = matcher.condition(index).map(|node| node.to_string()).unwrap_or_default();
    println!(
        "  {} {}",
        palette.paint(format!("[{index}]"), ansi::GRAY),
        palette.bold(palette.paint(preview(&text), ansi::GREEN))
    );
}

/// Error text for a failed compile, with a caret under the offending position.
pub fn compile_error(conditions: &[String], err: &CompileError, color: bool) -> String {
    let palette = ansi::Palette::new(color);
    let mut out = format!("{} {err}", palette.bold(palette.paint("error:", ansi::RED)));

    let ConditionError::Syntax(syntax) = &err.cause else {
        return out;
    };
    let Some(text) = conditions.get(err.index) else {
        return out;
    };
    // Line breaks inside a condition would throw the caret off.
    let shown: String = text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }).collect();
    let caret = " ".repeat(syntax.offset().saturating_sub(1));
    out.push_str(&format!("\n\n  {shown}\n  {caret}{}", palette.paint("^", ansi::RED)));
    out
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}
