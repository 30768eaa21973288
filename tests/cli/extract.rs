use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const MENU_SCENE: &str = r#"[gd_scene load_steps=2 format=2]

[ext_resource path="res://ui/Menu.gd" type="Script" id=1]

[node name="Menu" type="Control"]
script = ExtResource( 1 )

[node name="Title" type="Label" parent="."]
text = "Learn GDScript"

[node name="Start" type="Button" parent="."]
text = "Start"

[node name="Search" type="LineEdit" parent="."]
placeholder_text = "Search lessons"
"#;

const MENU_SCRIPT: &str = r#"extends Control

func _ready() -> void:
	$Start.text = tr("Start")
	$Title.hint_tooltip = tr("Learn programming with Godot")
"#;

const LESSON: &str = r#"[gd_resource type="Resource" load_steps=3 format=2]

[sub_resource type="Resource" id=1]
text = "A variable is a name for a value."

[sub_resource type="Resource" id=2]
question = "Which keyword declares a variable?"
answer_options = [ "var", "func", "const" ]
valid_answers = [ "var" ]

[resource]
title = "Variables"
"#;

fn project() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file("ui/Menu.tscn", MENU_SCENE)?;
    test.write_file("ui/Menu.gd", MENU_SCRIPT)?;
    test.write_file("course/lesson-1-variables/lesson.tres", LESSON)?;
    Ok(test)
}

#[test]
fn test_extracts_application_and_lessons() -> Result<()> {
    let test = project()?;

    let output = test.run()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let application = test.read_file("i18n/application.pot")?;
    assert!(application.starts_with("# Translations template for Learn GDScript From Zero.\n"));
    assert!(application.contains(
        "#: ui/Menu.gd:4 ui/Menu.tscn:12\nmsgid \"Start\"\nmsgstr \"\"\n"
    ));
    assert!(application.contains("#: ui/Menu.gd:5\nmsgid \"Learn programming with Godot\"\n"));
    assert!(application.contains("#: ui/Menu.tscn:9\nmsgid \"Learn GDScript\"\n"));
    assert!(application.contains("#: ui/Menu.tscn:15\nmsgid \"Search lessons\"\n"));
    assert_eq!(application.matches("msgid \"Start\"").count(), 1);

    let lesson = test.read_file("i18n/lesson-1-variables.pot")?;
    for id in [
        "A variable is a name for a value.",
        "Which keyword declares a variable?",
        "var",
        "func",
        "const",
        "Variables",
    ] {
        assert_eq!(
            lesson.matches(&format!("msgid \"{}\"\n", id)).count(),
            1,
            "expected exactly one entry for {:?}",
            id
        );
    }
    // Two locations do not fit on one 76-column line.
    assert!(lesson.contains(
        "#: course/lesson-1-variables/lesson.tres:8\n\
         #: course/lesson-1-variables/lesson.tres:9\n\
         msgid \"var\"\n"
    ));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Reading application messages..."));
    assert!(stdout.contains("Wrote i18n/application.pot"));
    assert!(stdout.contains("Wrote i18n/lesson-1-variables.pot"));
    Ok(())
}

#[test]
fn test_only_lesson_directories_are_extracted() -> Result<()> {
    let test = project()?;
    test.write_file("course/lesson-2-functions/lesson.tres", LESSON)?;
    test.write_file("course/lessons-extra/lesson.tres", LESSON)?;
    test.write_file("course/lesson-1", "a plain file")?;

    let output = test.run()?;
    assert!(output.status.success());

    assert!(test.exists("i18n/lesson-1-variables.pot"));
    assert!(test.exists("i18n/lesson-2-functions.pot"));
    assert!(!test.exists("i18n/lessons-extra.pot"));
    assert!(!test.exists("i18n/lesson-1.pot"));
    Ok(())
}

#[test]
fn test_empty_course_is_not_an_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("ui/Menu.tscn", MENU_SCENE)?;
    test.create_dir("course/assets")?;

    let output = test.run()?;
    assert!(output.status.success());

    let entries: Vec<_> = std::fs::read_dir(test.root().join("i18n"))?.collect();
    assert_eq!(entries.len(), 1);
    assert!(test.exists("i18n/application.pot"));
    Ok(())
}

#[test]
fn test_rerun_produces_identical_files() -> Result<()> {
    let test = project()?;

    test.run()?;
    let first = (
        test.read_file("i18n/application.pot")?,
        test.read_file("i18n/lesson-1-variables.pot")?,
    );
    test.run()?;
    let second = (
        test.read_file("i18n/application.pot")?,
        test.read_file("i18n/lesson-1-variables.pot")?,
    );

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_crlf_source_gives_lf_message_ids() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "ui/Intro.tscn",
        "[node name=\"Intro\" type=\"RichTextLabel\"]\r\nbbcode_text = \"[b]Welcome[/b]\r\nLet's start.\"\r\n",
    )?;

    let output = test.run()?;
    assert!(output.status.success());

    let application = test.read_file("i18n/application.pot")?;
    assert!(application.contains("msgid \"\"\n\"[b]Welcome[/b]\\n\"\n\"Let's start.\"\n"));
    assert!(!application.contains("\\r"));
    Ok(())
}

#[test]
fn test_syntax_error_aborts_run() -> Result<()> {
    let test = project()?;
    test.write_file(
        "course/lesson-2-broken/lesson.tres",
        "[resource]\ntitle = \"never closed\n",
    )?;

    let output = test.run()?;
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: "));
    assert!(stderr.contains("course/lesson-2-broken/lesson.tres:2: unterminated string literal"));
    // The application template was written before the failing lesson.
    assert!(test.exists("i18n/application.pot"));
    assert!(!test.exists("i18n/lesson-1-variables.pot"));
    Ok(())
}

#[test]
fn test_missing_course_dir_fails() -> Result<()> {
    let test = project()?;
    std::fs::remove_dir_all(test.root().join("course"))?;

    let output = test.run()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read course directory"));
    Ok(())
}

#[test]
fn test_verbose_lists_files() -> Result<()> {
    let test = project()?;

    let output = test.command().arg("--verbose").output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  Extracting from file 'ui/Menu.gd'\n"));
    assert!(stdout.contains("  Extracting from file 'course/lesson-1-variables/lesson.tres'\n"));
    Ok(())
}

#[test]
fn test_config_file_overrides_layout() -> Result<()> {
    let test = project()?;
    test.write_file(
        ".gdextractrc.json",
        r#"{ "outputDir": "locale", "metadata": { "copyrightHolder": "Example Studio" } }"#,
    )?;

    let output = test.run()?;
    assert!(output.status.success());

    let application = test.read_file("locale/application.pot")?;
    assert!(application.contains("# Copyright (C) YEAR Example Studio\n"));
    assert!(test.exists("locale/lesson-1-variables.pot"));
    assert!(!test.exists("i18n"));
    Ok(())
}

#[test]
fn test_root_flag() -> Result<()> {
    let test = project()?;

    let output = test
        .command()
        .current_dir(test.root().parent().unwrap_or(test.root()))
        .arg("--root")
        .arg(test.root())
        .output()?;
    assert!(output.status.success());
    assert!(test.exists("i18n/application.pot"));
    Ok(())
}
