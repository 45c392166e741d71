//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the main application.

use clap::{Arg, ArgAction, Command as ClapCommand};

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("cone-steering")
        .version("0.1.0")
        .about("Cone-based steering from camera frames")
        .arg(
            Arg::new("cam")
                .long("cam")
                .value_name("INDEX")
                .value_parser(clap::value_parser!(i32))
                .conflicts_with("video")
                .help("Camera index"),
        )
        .arg(
            Arg::new("video")
                .short('v')
                .long("video")
                .value_name("PATH")
                .help("Video file path"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_parser(clap::value_parser!(u32))
                .help("Expected frame width"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_parser(clap::value_parser!(u32))
                .help("Expected frame height"),
        )
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("PATH")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show the cleaned color masks"),
        )
        .arg(
            Arg::new("no-display")
                .long("no-display")
                .action(ArgAction::SetTrue)
                .help("Run without GUI windows"),
        )
        .arg(
            Arg::new("label")
                .short('l')
                .long("label")
                .value_name("TEXT")
                .help("Label printed with every frame"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print an example configuration and exit"),
        )
}

#[test]
fn test_help_argument() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["cone-steering", "--help"]);

    // Help should cause an error (but a specific help error)
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn test_no_arguments() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["cone-steering"]);

    // Should succeed with nothing set
    assert!(result.is_ok());
    let matches = result.unwrap();
    assert!(matches.get_one::<i32>("cam").is_none());
    assert!(matches.get_one::<String>("video").is_none());
    assert!(!matches.get_flag("verbose"));
    assert!(!matches.get_flag("no-display"));
}

#[test]
fn test_cam_argument() {
    let cmd = create_test_command();
    let matches = cmd.try_get_matches_from(vec!["cone-steering", "--cam", "2"]).unwrap();
    assert_eq!(matches.get_one::<i32>("cam"), Some(&2));
}

#[test]
fn test_invalid_cam_index() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["cone-steering", "--cam", "front"]);
    assert!(result.is_err());
}

#[test]
fn test_video_argument() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec!["cone-steering", "--video", "track.mp4"])
        .unwrap();
    assert_eq!(matches.get_one::<String>("video").map(|s| s.as_str()), Some("track.mp4"));
}

#[test]
fn test_cam_video_conflict() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["cone-steering", "--cam", "0", "--video", "track.mp4"]);

    // Should fail due to conflict
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn test_frame_size_arguments() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec!["cone-steering", "--width", "1280", "--height", "720"])
        .unwrap();
    assert_eq!(matches.get_one::<u32>("width"), Some(&1280));
    assert_eq!(matches.get_one::<u32>("height"), Some(&720));

    let cmd = create_test_command();
    assert!(cmd.try_get_matches_from(vec!["cone-steering", "--width", "-640"]).is_err());
}

#[test]
fn test_boolean_flags() {
    let flags = vec!["--verbose", "--no-display", "--debug", "--print-config"];

    for flag in flags {
        let cmd = create_test_command();
        let result = cmd.try_get_matches_from(vec!["cone-steering", flag]);
        assert!(result.is_ok(), "Should accept flag: {}", flag);
        let matches = result.unwrap();
        let id = flag.trim_start_matches("--");
        assert!(matches.get_flag(id), "Flag not set: {}", flag);
    }
}

#[test]
fn test_config_file_argument() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec!["cone-steering", "-C", "track.yaml"])
        .unwrap();
    assert_eq!(matches.get_one::<String>("config").map(|s| s.as_str()), Some("track.yaml"));
}

#[test]
fn test_multiple_arguments() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec![
            "cone-steering",
            "--video",
            "lap.avi",
            "--config",
            "track.yaml",
            "--label",
            "lap-3",
            "--no-display",
            "-d",
        ])
        .unwrap();

    assert_eq!(matches.get_one::<String>("video").map(|s| s.as_str()), Some("lap.avi"));
    assert_eq!(matches.get_one::<String>("label").map(|s| s.as_str()), Some("lap-3"));
    assert!(matches.get_flag("no-display"));
    assert!(matches.get_flag("debug"));
    assert!(!matches.get_flag("verbose"));
}
