use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use opz_core::{Decoder, TextLogSource, decode_source};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let decoder =
        Decoder::bundled().map_err(|err| format!("failed to load bundled dictionary: {}", err))?;
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.txt");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_report.json");
        regenerate_one(&decoder, &input, &output)?;
    }

    Ok(())
}

fn regenerate_one(decoder: &Decoder, input: &Path, output: &Path) -> Result<(), String> {
    let file =
        File::open(input).map_err(|err| format!("failed to open {}: {}", input.display(), err))?;
    let bytes = file
        .metadata()
        .map_err(|err| format!("failed to stat {}: {}", input.display(), err))?
        .len();
    let source = TextLogSource::new(BufReader::new(file));
    let report = decode_source(&input.display().to_string(), bytes, source, decoder)
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json + "\n")
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
