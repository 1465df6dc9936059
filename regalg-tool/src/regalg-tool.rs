#![allow(clippy::uninlined_format_args)]

use regalg::{backends, split_words, Error, Flags, Regex, WordBreakAlgorithm};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "regalg-tool")]
struct Opt {
    /// The regular expression.
    pattern: String,

    /// The flags of the regular expression, drawn from "imsxAw".
    #[structopt(long, short, parse(from_str = Flags::from))]
    flags: Option<Flags>,

    /// Match with the parsed tree, skipping simplification.
    #[structopt(long)]
    no_opt: bool,

    /// Dump the parsed tree to stdout.
    #[structopt(long)]
    dump_parse: bool,

    /// Dump the simplified tree to stdout.
    #[structopt(long)]
    dump_simplified: bool,

    /// Dump the bytecode to stdout.
    #[structopt(long)]
    dump_bytecode: bool,

    /// Dump all compilation phases to stdout.
    #[structopt(long, short)]
    verbose: bool,

    /// Print the word segments of each input instead of matching.
    #[structopt(long)]
    words: bool,

    /// The input values to match against.
    #[structopt(conflicts_with_all = &["bench", "file"])]
    inputs: Vec<String>,

    /// Match against the contents of a specified file.
    #[structopt(long, conflicts_with_all = &["bench", "inputs"])]
    file: Option<PathBuf>,

    /// Benchmark the matches of the specified file.
    #[structopt(long, conflicts_with_all = &["file", "inputs"])]
    bench: Option<PathBuf>,
}

fn format_match(m: &regalg::Match, input: &str) -> String {
    let mut result = format!("\"{}\" ({}..{})", m.as_str(input), m.start(), m.end());
    if !m.captures.is_empty() {
        result.push_str(", captures: [");
        for (i, cg) in m.captures.iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            match cg {
                Some(r) => result.push_str(&format!("\"{}\" ({}..{})", &input[r.clone()], r.start, r.end)),
                None => result.push_str("None"),
            }
        }
        result.push(']');
    }
    result
}

fn exec_re_on_string(re: &Regex, input: &str) {
    let mut matches = re.find_iter(input);
    if let Some(res) = matches.next() {
        let count = 1 + matches.count();
        println!("Match: {}, total: {}", format_match(&res, input), count);
    } else {
        println!("No match");
    }
}

fn print_words(input: &str, flags: Flags) {
    let algorithm = if flags.simple_word_break {
        WordBreakAlgorithm::Simple
    } else {
        WordBreakAlgorithm::Default
    };
    println!("{:?}", split_words(input, algorithm));
}

fn bench_re_on_path(re: &Regex, path: &Path) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            println!("{}: {}", err, path.display());
            return;
        }
    };
    let input = contents.as_str();
    // Warmup
    re.find_iter(input).count();
    let start = Instant::now();
    for _ in 0..25 {
        re.find_iter(input).count();
    }
    let duration = start.elapsed();
    println!("{} ms", duration.as_millis());
}

fn main() -> Result<(), Error> {
    let args = Opt::from_args();

    let mut flags = args.flags.unwrap_or_default();
    flags.no_opt |= args.no_opt;

    let raw = backends::try_parse(&args.pattern, flags)?;
    if args.verbose || args.dump_parse {
        println!("Parsed:\n{}", raw);
    }
    let mut simplified = raw.clone();
    backends::simplify(&mut simplified);
    if args.verbose || args.dump_simplified {
        println!("Simplified:\n{}", simplified);
    }
    if args.verbose || args.dump_bytecode {
        let cr = backends::emit(if flags.no_opt { &raw } else { &simplified });
        println!("Bytecode:\n{:#?}", cr);
    }

    let re = Regex::with_flags(&args.pattern, flags)?;
    if let Some(ref path) = args.file {
        match fs::read_to_string(path) {
            Ok(contents) => exec_re_on_string(&re, contents.as_str()),
            Err(err) => println!("{}: {}", err, path.display()),
        };
    } else if let Some(ref path) = args.bench {
        bench_re_on_path(&re, path);
    } else if args.words {
        for input in args.inputs {
            print_words(&input, flags);
        }
    } else {
        for input in args.inputs {
            exec_re_on_string(&re, &input);
        }
    }
    Ok(())
}
