use anyhow::Result;

use crate::{CliTest, stderr, stdout};

const HERO: &str = r#"export default function Hero() {
  return <h1>Welcome</h1>;
}
"#;

const NAV: &str = r#""use client";

export function Nav() {
  return <button>Open menu</button>;
}
"#;

fn setup() -> Result<CliTest> {
    let test = CliTest::with_file("src/components/Hero.tsx", HERO)?;
    test.write_file("src/components/Nav.tsx", NAV)?;
    test.write_file(
        "tolk.keys.json",
        r#"{ "Welcome": "hero.welcome", "Open menu": "nav.openMenu" }"#,
    )?;
    Ok(test)
}

#[test]
fn test_wrap_dry_run_leaves_files_untouched() -> Result<()> {
    let test = setup()?;

    let output = test.wrap_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Would rewrite 2 string(s) in 2 file(s):"), "{}", out);
    assert!(out.contains("src/components/Hero.tsx"));
    assert!(out.contains("Client namespaces: nav"));
    assert!(out.contains("Run with --apply to write these changes."));

    assert_eq!(test.read_file("src/components/Hero.tsx")?, HERO);
    assert_eq!(test.read_file("src/components/Nav.tsx")?, NAV);

    Ok(())
}

#[test]
fn test_wrap_apply_rewrites_server_and_client() -> Result<()> {
    let test = setup()?;

    let output = test.wrap_command().arg("--apply").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Rewrote 2 string(s) in 2 file(s):"));

    let hero = test.read_file("src/components/Hero.tsx")?;
    assert!(hero.contains(r#"import { getTranslations } from "next-intl/server";"#));
    assert!(hero.contains("export default async function Hero()"));
    assert!(hero.contains(r#"const t = await getTranslations("hero");"#));
    assert!(hero.contains(r#"<h1>{t("welcome")}</h1>"#));

    let nav = test.read_file("src/components/Nav.tsx")?;
    assert!(nav.starts_with("\"use client\";\n"));
    assert!(nav.contains(r#"import { useTranslations } from "next-intl";"#));
    assert!(nav.contains(r#"const t = useTranslations("nav");"#));
    assert!(nav.contains(r#"<button>{t("openMenu")}</button>"#));

    // A second run finds nothing left to do.
    let output = test.wrap_command().arg("--apply").output()?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("nothing to rewrite"));
    assert_eq!(test.read_file("src/components/Hero.tsx")?, hero);

    Ok(())
}

#[test]
fn test_wrap_qualifies_bare_keys_by_component() -> Result<()> {
    let test = setup()?;
    test.write_file(
        "tolk.keys.json",
        r#"{ "Welcome": "welcome", "Open menu": "openMenu" }"#,
    )?;

    let output = test.wrap_command().arg("--apply").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Client namespaces: nav"));

    let hero = test.read_file("src/components/Hero.tsx")?;
    assert!(hero.contains(r#"const t = await getTranslations("hero");"#));
    assert!(hero.contains(r#"<h1>{t("welcome")}</h1>"#));

    let nav = test.read_file("src/components/Nav.tsx")?;
    assert!(nav.contains(r#"const t = useTranslations("nav");"#));
    assert!(nav.contains(r#"<button>{t("openMenu")}</button>"#));

    Ok(())
}

#[test]
fn test_wrap_inline_mode() -> Result<()> {
    let test = setup()?;

    let output = test
        .wrap_command()
        .args(["--mode", "inline", "--apply"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let nav = test.read_file("src/components/Nav.tsx")?;
    assert!(nav.contains(r#"<button><T id="nav.openMenu">Open menu</T></button>"#));
    assert!(nav.contains(r#"from "@/components/i18n";"#));

    let hero = test.read_file("src/components/Hero.tsx")?;
    assert!(hero.contains(r#"<h1><T id="hero.welcome">Welcome</T></h1>"#));
    assert!(hero.contains(r#"from "@/components/i18n/server";"#));

    Ok(())
}

#[test]
fn test_wrap_keys_flag_and_config_file() -> Result<()> {
    let test = CliTest::with_file("web/Hero.tsx", HERO)?;
    test.write_file(".tolkrc.json", r#"{ "includes": ["web"] }"#)?;
    test.write_file("custom-keys.json", r#"{ "Welcome": "landing.welcome" }"#)?;

    let output = test
        .wrap_command()
        .args(["--keys", "custom-keys.json", "--apply"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let hero = test.read_file("web/Hero.tsx")?;
    assert!(hero.contains(r#"getTranslations("landing")"#));
    assert!(hero.contains(r#"t("welcome")"#));

    Ok(())
}

#[test]
fn test_wrap_missing_key_map_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let output = test.wrap_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read key map"));

    Ok(())
}

#[test]
fn test_wrap_skips_unparseable_file() -> Result<()> {
    let test = setup()?;
    test.write_file("src/components/Broken.tsx", "export const x = <div>;\n")?;

    let output = test.wrap_command().args(["--apply", "-v"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("parse-error"));
    assert!(stderr(&output).contains("src/components/Broken.tsx"));
    assert!(test.read_file("src/components/Hero.tsx")?.contains("getTranslations"));

    Ok(())
}
