//! `batchtool` - encode and decode OData-style `$batch` bodies.
//!
//! ```text
//! batchtool encode --mode request --input requests.json --output body.txt
//! batchtool decode --mode response --content-type "multipart/mixed; boundary=batch_x" --input reply.txt --expect requests.json
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use batch::{
    BatchConfig, BatchEnvelope, BatchReader, BatchWriter, LineEnding, RequestLine, StartLine,
    StatusLine,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Serialize, de::DeserializeOwned};

mod error;

use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "batchtool", version, about = "Encode and decode multipart/mixed batch bodies")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log filter directive, e.g. `info` or `batch=debug`
    #[arg(long, global = true, env = "BATCHTOOL_LOG", default_value = "warn")]
    log: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serialize a JSON envelope into a batch body and print its Content-Type
    Encode(EncodeArgs),
    /// Parse a batch body and print it as a JSON envelope
    Decode(DecodeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Request,
    Response,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(long, value_enum)]
    mode: ModeArg,

    /// JSON envelope to encode
    #[arg(long)]
    input: PathBuf,

    /// Where the batch body is written
    #[arg(long)]
    output: PathBuf,

    /// `crlf` or `lf`
    #[arg(
        long,
        env = "BATCHTOOL_LINE_ENDING",
        default_value = "crlf",
        value_parser = str::parse::<LineEnding>
    )]
    line_ending: LineEnding,

    /// Content id given to the first changeset part without one
    #[arg(long, default_value_t = 1)]
    first_content_id: u64,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[arg(long, value_enum)]
    mode: ModeArg,

    /// Content-Type value naming the outer boundary
    #[arg(long)]
    content_type: String,

    /// Batch body to decode
    #[arg(long)]
    input: PathBuf,

    /// Request envelope (JSON) the body answers; enables cardinality checks
    /// and changeset failure propagation
    #[arg(long)]
    expect: Option<PathBuf>,
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_envelope<L: StartLine + DeserializeOwned>(path: &Path) -> Result<BatchEnvelope<L>, CliError> {
    Ok(serde_json::from_slice(&read_file(path)?)?)
}

fn encode<L: StartLine + DeserializeOwned>(args: &EncodeArgs) -> Result<String, CliError> {
    let envelope = read_envelope::<L>(&args.input)?;
    let config = BatchConfig {
        line_ending: args.line_ending,
        first_content_id: args.first_content_id,
    };

    let encoded = BatchWriter::new().with_config(config).write(&envelope);
    fs::write(&args.output, &encoded.body).map_err(|source| CliError::Write {
        path: args.output.clone(),
        source,
    })?;

    tracing::info!(
        component = "batchtool",
        output = %args.output.display(),
        line_ending = %args.line_ending,
        bytes = encoded.body.len(),
        "batch encoded"
    );
    Ok(encoded.content_type)
}

fn decode<L: StartLine + Serialize>(args: &DecodeArgs) -> Result<String, CliError> {
    let body = read_file(&args.input)?;

    let envelope = match &args.expect {
        Some(expect) => {
            let expected = read_envelope::<RequestLine>(expect)?.shape();
            BatchReader::read_matching::<L>(&args.content_type, &body, &expected)?
        }
        None => BatchReader::read::<L>(&args.content_type, &body)?,
    };

    tracing::info!(
        component = "batchtool",
        parts = envelope.parts.len(),
        changesets = envelope.changesets.len(),
        "batch decoded"
    );
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn run(cli: &Cli) -> Result<String, CliError> {
    match &cli.command {
        Command::Encode(args) => match args.mode {
            ModeArg::Request => encode::<RequestLine>(args),
            ModeArg::Response => encode::<StatusLine>(args),
        },
        Command::Decode(args) => match args.mode {
            ModeArg::Request => decode::<RequestLine>(args),
            ModeArg::Response => decode::<StatusLine>(args),
        },
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    shared::init_logging(&cli.log);

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use batch::{Changeset, RequestBatch, RequestPart};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("batchtool-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_parse_encode_args() {
        let cli = Cli::try_parse_from([
            "batchtool",
            "encode",
            "--mode",
            "request",
            "--input",
            "in.json",
            "--output",
            "out.txt",
            "--line-ending",
            "lf",
        ])
        .unwrap();

        let Command::Encode(args) = cli.command else {
            panic!("expected encode command");
        };
        assert_eq!(args.mode, ModeArg::Request);
        assert_eq!(args.line_ending, LineEnding::Lf);
        assert_eq!(args.first_content_id, 1);
    }

    #[test]
    fn test_unknown_line_ending_is_rejected() {
        let result = Cli::try_parse_from([
            "batchtool",
            "encode",
            "--mode",
            "response",
            "--input",
            "in.json",
            "--output",
            "out.txt",
            "--line-ending",
            "cr",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_decode_requires_content_type() {
        let result = Cli::try_parse_from([
            "batchtool",
            "decode",
            "--mode",
            "response",
            "--input",
            "in.txt",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_encode_then_decode_files() {
        let envelope = RequestBatch::new()
            .part(RequestPart::request("GET", "/Customers"))
            .changeset(
                Changeset::new().part(RequestPart::request("POST", "/Customers").body("{}")),
            );

        let input = temp_path("requests.json");
        let output = temp_path("body.txt");
        fs::write(&input, serde_json::to_vec(&envelope).unwrap()).unwrap();

        let encode_args = EncodeArgs {
            mode: ModeArg::Request,
            input: input.clone(),
            output: output.clone(),
            line_ending: LineEnding::Crlf,
            first_content_id: 1,
        };
        let content_type = encode::<RequestLine>(&encode_args).unwrap();

        let decode_args = DecodeArgs {
            mode: ModeArg::Request,
            content_type,
            input: output.clone(),
            expect: Some(input.clone()),
        };
        let json = decode::<RequestLine>(&decode_args).unwrap();
        let decoded: RequestBatch = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.parts[0].start.target, "/Customers");
        assert_eq!(decoded.changesets[0].parts[0].body, b"{}");
        assert_eq!(decoded.changesets[0].parts[0].content_id.as_deref(), Some("1"));

        let _ = fs::remove_file(input);
        let _ = fs::remove_file(output);
    }
}
