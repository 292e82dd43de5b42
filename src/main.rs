use clap::{arg, crate_version, Command};
use bytecrunch::token::Token;
use bytecrunch::{huffman, lz, lzhuff, Error, DYNERR, STD_OPTIONS};

const METHODS: [&str; 3] = ["lz", "huffman", "lzhuff"];
const RCH: &str = "unreachable was reached";

fn compress(method: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
    match method {
        "lz" => lz::compress(data),
        "huffman" => huffman::compress_with_limit(data, STD_OPTIONS.max_code_length),
        "lzhuff" => lzhuff::compress(data),
        _ => unreachable!("{}", RCH),
    }
}

fn expand(method: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
    match method {
        "lz" => lz::expand(data),
        "huffman" => huffman::expand(data),
        "lzhuff" => lzhuff::expand(data),
        _ => unreachable!("{}", RCH),
    }
}

/// Writes a human-readable parse listing to `path` (the `-log` option):
/// one line per chosen item for `lz`/`lzhuff`, both of which are driven by
/// the same reference-table/optimal-parser machinery; `huffman` has no
/// per-position token stream to show.
fn dump_parse(method: &str, data: &[u8], path: &std::path::Path) -> Result<(), DYNERR> {
    let mut text = String::new();
    match method {
        "lz" => {
            let result = lz::parser::parse(data)?;
            text.push_str(&format!("mode=lz num_fixed_bits={}\n", result.num_fixed_bits));
            dump_items(&mut text, result.items.iter().map(|item| item.token));
        }
        "lzhuff" => {
            let result = lzhuff::parse(data)?;
            text.push_str(&format!(
                "mode=lzhuff num_fixed_bits={} marker={}\n",
                result.num_fixed_bits(),
                result.marker()
            ));
            dump_items(&mut text, result.items().iter().copied());
        }
        "huffman" => {
            text.push_str("mode=huffman has no per-position parse; see the compressed output\n");
        }
        _ => unreachable!("{}", RCH),
    }
    std::fs::write(path, text)?;
    Ok(())
}

fn dump_items(text: &mut String, items: impl Iterator<Item = Token>) {
    let mut pos = 0usize;
    for token in items {
        match token {
            Token::Literal(v) => text.push_str(&format!("{pos:6}  literal  {v:#04x}\n")),
            Token::Reference { offset, length_minus_one } => {
                text.push_str(&format!(
                    "{pos:6}  ref      offset={offset} length={}\n",
                    length_minus_one as usize + 1
                ));
            }
        }
        pos += token.length();
    }
}

fn main() -> Result<(), DYNERR> {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:      `bytecrunch compress -m lz -i my_file -o my_file.lz`
Expand:        `bytecrunch expand -m lz -i my_file.lz -o my_file`";

    let mut main_cmd = Command::new("bytecrunch")
        .about("Optimal LZ77 and canonical Huffman compression for small binary blobs")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("compress")
            .arg(arg!(-m --method <METHOD> "compression mode").value_parser(METHODS).required(true))
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .arg(arg!(-l --log <PATH> "dump a human-readable parse listing here").required(false))
            .arg(arg!(--verify "decompress the output and compare against the input"))
            .about("compress a file"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("expand")
            .arg(arg!(-m --method <METHOD> "compression mode").value_parser(METHODS).required(true))
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("expand a file"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let log_path = cmd.get_one::<String>("log");
        let verify = cmd.get_flag("verify");

        let dat = std::fs::read(path_in).map_err(|e| {
            log::error!("error reading '{path_in}': {e}");
            e
        })?;

        if let Some(log_path) = log_path {
            dump_parse(method, &dat, std::path::Path::new(log_path))?;
        }

        let compressed = compress(method, &dat)?;

        if verify {
            let expanded = expand(method, &compressed)?;
            if expanded != dat {
                log::error!("verification failed: round-trip of '{path_in}' did not match");
                return Err(Box::new(Error::VerificationFailed));
            }
        }

        std::fs::write(path_out, compressed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);

        let dat = std::fs::read(path_in).map_err(|e| {
            log::error!("error reading '{path_in}': {e}");
            e
        })?;
        let expanded = expand(method, &dat)?;
        std::fs::write(path_out, expanded)?;
    }

    Ok(())
}
