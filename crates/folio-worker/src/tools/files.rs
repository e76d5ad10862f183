use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use folio_registry::{ToolMeta, ToolRegistry};
use folio_schemas::{ParamSpec, ParamType};
use serde::Deserialize;
use serde_json::Value;

use super::decode_args;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const UTF16_LE_BOM: &[u8] = b"\xff\xfe";
const UTF16_BE_BOM: &[u8] = b"\xfe\xff";

#[derive(Deserialize)]
struct ReadFileArgs {
    path: PathBuf,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct ListFilesArgs {
    dir: PathBuf,
}

fn decode_utf16(raw: &[u8], big_endian: bool) -> String {
    let units = raw.chunks(2).map(|c| {
        let pair = [c[0], c.get(1).copied().unwrap_or(0)];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// UTF-16 with an optional BOM; little-endian when there is none.
fn decode_utf16_bom(raw: &[u8]) -> String {
    if let Some(rest) = raw.strip_prefix(UTF16_BE_BOM) {
        decode_utf16(rest, true)
    } else {
        decode_utf16(raw.strip_prefix(UTF16_LE_BOM).unwrap_or(raw), false)
    }
}

fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| b as char).collect()
}

/// Decode file bytes as text.
///
/// With no encoding: strict UTF-8, then BOM sniffing (UTF-16 / UTF-8 with
/// BOM), then Latin-1, which never fails. `binary` returns lowercase hex.
pub fn decode_text(raw: Vec<u8>, encoding: Option<&str>) -> Result<String> {
    let Some(enc) = encoding else {
        let raw = match String::from_utf8(raw) {
            Ok(s) => return Ok(s),
            Err(e) => e.into_bytes(),
        };
        if raw.starts_with(UTF16_LE_BOM) || raw.starts_with(UTF16_BE_BOM) {
            return Ok(decode_utf16_bom(&raw));
        }
        if let Some(rest) = raw.strip_prefix(UTF8_BOM) {
            return Ok(String::from_utf8_lossy(rest).into_owned());
        }
        return Ok(decode_latin1(&raw));
    };

    let text = match enc.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "binary" => hex::encode(&raw),
        "utf-8" | "utf8" => String::from_utf8_lossy(&raw).into_owned(),
        "utf-8-sig" => {
            String::from_utf8_lossy(raw.strip_prefix(UTF8_BOM).unwrap_or(&raw[..])).into_owned()
        }
        "utf-16" | "utf16" => decode_utf16_bom(&raw),
        "utf-16-le" | "utf-16le" => decode_utf16(&raw, false),
        "utf-16-be" | "utf-16be" => decode_utf16(&raw, true),
        "latin-1" | "latin1" | "iso-8859-1" => decode_latin1(&raw),
        other => bail!("unsupported encoding: {other}"),
    };
    Ok(text)
}

pub fn register_file_tools(reg: &mut ToolRegistry) -> Result<()> {
    reg.register(
        ToolMeta::new("read_file", "Read a file as text (or hex with encoding=binary)")
            .required_param("path", ParamSpec::new(ParamType::String))
            .param(
                "encoding",
                ParamSpec::new(ParamType::String)
                    .describe("utf-8, utf-16, latin-1 or binary; auto-detected when omitted"),
            ),
        |args| {
            let a: ReadFileArgs = decode_args("read_file", args)?;
            let raw = fs::read(&a.path)
                .with_context(|| format!("failed to read file: {}", a.path.display()))?;
            Ok(Value::String(decode_text(raw, a.encoding.as_deref())?))
        },
    )?;

    reg.register(
        ToolMeta::new("list_files", "List the entry names of a directory")
            .required_param("dir", ParamSpec::new(ParamType::String)),
        |args| {
            let a: ListFilesArgs = decode_args("list_files", args)?;
            let mut names = Vec::new();
            for entry in fs::read_dir(&a.dir)
                .with_context(|| format!("failed to list directory: {}", a.dir.display()))?
            {
                let entry = entry.context("failed to read directory entry")?;
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            names.sort();
            Ok(Value::from(names))
        },
    )?;

    Ok(())
}
