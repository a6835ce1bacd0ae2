use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_extract_prints_candidates_as_json() -> Result<()> {
    let test = CliTest::with_file(
        "src/components/Hero.tsx",
        r#"export function Hero() {
  return (
    <section>
      <h1>Welcome to our platform</h1>
      <input placeholder="Your email" className="input" />
    </section>
  );
}
"#,
    )?;

    let output = test.extract_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let parsed: Value =
        serde_json::from_str(&stdout(&output)).context("stdout should be valid JSON")?;
    let strings = parsed.as_array().context("candidates should be an array")?;
    assert_eq!(strings.len(), 2);
    assert_eq!(strings[0]["text"], "Welcome to our platform");
    assert_eq!(strings[0]["type"], "jsx-text");
    assert_eq!(strings[0]["file"], "src/components/Hero.tsx");
    assert_eq!(strings[0]["componentName"], "Hero");
    assert_eq!(strings[1]["text"], "Your email");
    assert_eq!(strings[1]["propName"], "placeholder");

    Ok(())
}

#[test]
fn test_extract_to_file() -> Result<()> {
    let test = CliTest::with_file(
        "app/page.tsx",
        "export default function Page() { return <p>Hello world</p>; }\n",
    )?;

    let output = test
        .extract_command()
        .args(["--output", "candidates.json"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Extracted 1 candidate(s) to candidates.json"));

    let parsed: Value = serde_json::from_str(&test.read_file("candidates.json")?)?;
    assert_eq!(parsed[0]["text"], "Hello world");
    assert_eq!(parsed[0]["routePath"], "/");

    Ok(())
}

#[test]
fn test_extract_skips_unparseable_files() -> Result<()> {
    let test = CliTest::with_file(
        "src/Good.tsx",
        "export function Good() { return <p>Still here</p>; }\n",
    )?;
    test.write_file("src/Broken.tsx", "export function Broken() { return <p>; }\n")?;

    let output = test.extract_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let parsed: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    assert!(stderr(&output).contains("1 file(s) could not be parsed"));

    Ok(())
}
