//! The Cain CLI: encode and decode payloads, look inside schemas, export
//! them as bytes.

use cain::{
    decode_schema,
    dumps,
    loads,
    schema,
    schema_lookup_json,
    to_json_string,
    value_from_json,
    value_to_json,
    Schema,
    Value,
};
use clap::{
    Args,
    Parser,
    Subcommand,
};
use std::{
    fs,
    io::Write,
    path::{
        Path,
        PathBuf,
    },
    process::ExitCode,
};
use tracing::debug;


#[derive(Parser)]
#[command(name = "cain", version, about = "A small yet powerful data format")]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Encodes objects using the cain data format
    Encode(EncodeArgs),
    /// Decodes objects using the cain data format
    Decode(DecodeArgs),
    /// Manipulates cain schemas
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
}

#[derive(Args)]
struct EncodeArgs {
    /// The data to encode: a file path or a literal, JSON unless --raw
    input: String,
    /// The schema to encode the data with (raw schema bytes, or cain data
    /// when --schema-header is given)
    #[arg(long, short)]
    schema: String,
    /// Read the schema from the header of the cain data named by --schema
    #[arg(long)]
    schema_header: bool,
    /// Treat the input as raw bytes instead of JSON
    #[arg(long, short, conflicts_with = "include_header")]
    raw: bool,
    /// Prepend a header carrying the schema, making the output self-decoding
    #[arg(long = "include-header", alias = "header")]
    include_header: bool,
    /// Where to write the encoded data (stdout if omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct DecodeArgs {
    /// The data to decode: a file path or a literal
    input: String,
    /// The schema the data was encoded with; omit it when the input carries
    /// its own header
    #[arg(long, short)]
    schema: Option<String>,
    /// Read the schema from the header of the cain data named by --schema
    #[arg(long)]
    schema_header: bool,
    /// Skip JSON rendering (only meaningful for Binary-shaped output)
    #[arg(long, short)]
    raw: bool,
    /// Where to write the decoded data (stdout if omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[command(flatten)]
    json: JsonArgs,
}

#[derive(Subcommand)]
enum SchemaAction {
    /// Looks up what's inside the given schema
    Lookup(SchemaArgs),
    /// Exports the given schema as raw schema bytes
    Export(SchemaArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// The schema to inspect: raw schema bytes, or cain data when
    /// --schema-header is given
    input: String,
    /// Read the schema from the header of the cain data named by the input
    #[arg(long)]
    schema_header: bool,
    /// Where to write the result (stdout if omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[command(flatten)]
    json: JsonArgs,
}

#[derive(Args)]
struct JsonArgs {
    /// Indentation of the JSON output
    #[arg(long = "json-indent", default_value_t = 4, conflicts_with = "json_minify")]
    json_indent: usize,
    /// Emit minified JSON
    #[arg(long = "json-minify")]
    json_minify: bool,
    /// Escape non-ASCII characters in the JSON output
    #[arg(long = "json-ascii")]
    json_ascii: bool,
    /// Sort object keys (cain objects always decode with sorted keys)
    #[arg(long = "json-sort")]
    #[allow(dead_code)]
    json_sort: bool,
}

impl JsonArgs {
    fn render(&self, json: &serde_json::Value) -> String {
        let indent = if self.json_minify { None } else { Some(self.json_indent) };
        to_json_string(json, indent, self.json_ascii)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cain: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.action {
        Action::Encode(args) => {
            let schema = get_schema(&args.schema, args.schema_header)?;
            let data = get_input(&args.input)?;
            let value = if args.raw {
                Value::Bytes(data)
            } else {
                let json: serde_json::Value = serde_json::from_slice(&data)?;
                value_from_json(&schema, &json)?
            };
            let encoded = dumps(&value, &schema, args.include_header)?;
            debug!(bytes = encoded.len(), "encoded");
            write_bytes(args.output.as_deref(), &encoded)?;
        }
        Action::Decode(args) => {
            let schema = args
                .schema
                .as_deref()
                .map(|src| get_schema(src, args.schema_header))
                .transpose()?;
            let data = get_input(&args.input)?;
            let value = loads(&data, schema.as_ref())?;
            if args.raw {
                match value {
                    Value::Bytes(bytes) => write_bytes(args.output.as_deref(), &bytes)?,
                    other => write_text(args.output.as_deref(), &format!("{other:?}"))?,
                }
            } else {
                let rendered = args.json.render(&value_to_json(&value));
                write_text(args.output.as_deref(), &rendered)?;
            }
        }
        Action::Schema { action } => match action {
            SchemaAction::Lookup(args) => {
                let schema = get_schema(&args.input, args.schema_header)?;
                let rendered = args.json.render(&schema_lookup_json(&schema));
                write_text(args.output.as_deref(), &rendered)?;
            }
            SchemaAction::Export(args) => {
                let schema = get_schema(&args.input, args.schema_header)?;
                write_bytes(args.output.as_deref(), &cain::encode_schema(&schema)?)?;
            }
        },
    }
    Ok(())
}

/// A file path reads as its contents; anything else is taken literally.
fn get_input(input: &str) -> std::io::Result<Vec<u8>> {
    if Path::new(input).is_file() {
        fs::read(input)
    } else {
        Ok(input.as_bytes().to_vec())
    }
}

fn get_schema(source: &str, from_header: bool) -> Result<Schema, Box<dyn std::error::Error>> {
    let data = get_input(source)?;
    if from_header {
        let framing = schema!(tuple((bytes), (bytes)));
        let (framed, _) = cain::decode(&framing, &data)?;
        match framed {
            Value::Tuple(blobs) => match blobs.into_iter().next() {
                Some(Value::Bytes(header)) => Ok(decode_schema(&header)?),
                _ => Err("the input carries no schema header".into()),
            },
            _ => Err("the input carries no schema header".into()),
        }
    } else {
        Ok(decode_schema(&data)?)
    }
}

fn write_bytes(output: Option<&Path>, bytes: &[u8]) -> std::io::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
        }
        None => {
            println!("{}", bytes.escape_ascii());
            Ok(())
        }
    }
}

fn write_text(output: Option<&Path>, text: &str) -> std::io::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(path)?;
            writeln!(file, "{text}")
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
