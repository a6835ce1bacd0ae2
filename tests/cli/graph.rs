use anyhow::Result;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_graph_classifies_client_closure() -> Result<()> {
    let test = CliTest::with_file(
        "src/components/Nav.tsx",
        r#""use client";
import { Logo } from "./Logo";

export function Nav() {
  return <nav><Logo /></nav>;
}
"#,
    )?;
    test.write_file(
        "src/components/Logo.tsx",
        "export function Logo() { return <span>Acme</span>; }\n",
    )?;
    test.write_file(
        "src/components/Footer.tsx",
        "export function Footer() { return <footer>Bye</footer>; }\n",
    )?;

    let output = test.graph_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("server  src/components/Footer.tsx"), "{}", out);
    assert!(out.contains("client  src/components/Logo.tsx"), "{}", out);
    assert!(out.contains("root    src/components/Nav.tsx"), "{}", out);
    assert!(out.contains("3 file(s): 1 client root(s), 1 client, 1 server"));

    Ok(())
}

#[test]
fn test_graph_follows_path_aliases() -> Result<()> {
    let test = CliTest::with_file(
        "tsconfig.json",
        r#"{
  // comments are allowed
  "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } }
}
"#,
    )?;
    test.write_file(
        "src/app/page.tsx",
        r#"import { useState } from "react";
import { Card } from "@/components/Card";

export default function Page() {
  const [open] = useState(false);
  return <Card />;
}
"#,
    )?;
    test.write_file(
        "src/components/Card.tsx",
        "export function Card() { return <div>Card</div>; }\n",
    )?;

    let output = test.graph_command().output()?;
    let out = stdout(&output);
    assert!(out.contains("root    src/app/page.tsx"), "{}", out);
    assert!(out.contains("client  src/components/Card.tsx"), "{}", out);

    Ok(())
}
