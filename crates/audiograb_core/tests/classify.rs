use audiograb_core::{classify_line, StatusTag};

#[test]
fn tagging_wins_over_error_when_both_appear() {
    assert_eq!(
        classify_line("[EmbedThumbnail] Embedding thumbnail; error ignored"),
        Some(StatusTag::Tagging)
    );
}

#[test]
fn warning_line_is_a_warning() {
    assert_eq!(classify_line("WARNING: retrying"), Some(StatusTag::Warning));
}

#[test]
fn destination_line_is_a_download_marker() {
    assert_eq!(
        classify_line("[ExtractAudio] Destination: song.mp3"),
        Some(StatusTag::Downloading)
    );
}

#[test]
fn converter_lines_are_converting() {
    assert_eq!(
        classify_line("[ExtractAudio] Extracting audio to song.mp3"),
        Some(StatusTag::Converting)
    );
    assert_eq!(
        classify_line("Post-processing with FFmpeg, 50% done"),
        Some(StatusTag::Converting)
    );
}

#[test]
fn converting_beats_error() {
    assert_eq!(
        classify_line("ffmpeg error: conversion failed"),
        Some(StatusTag::Converting)
    );
}

#[test]
fn cleanup_line() {
    assert_eq!(
        classify_line("Deleting original file song.webm (pass -k to keep)"),
        Some(StatusTag::Cleanup)
    );
}

#[test]
fn warning_beats_error_and_download() {
    assert_eq!(
        classify_line("[download] WARNING: error at 40%"),
        Some(StatusTag::Warning)
    );
}

#[test]
fn error_beats_download_catch_all() {
    assert_eq!(
        classify_line("ERROR: [download] 12% unable to continue"),
        Some(StatusTag::Error)
    );
}

#[test]
fn download_markers() {
    assert_eq!(
        classify_line("[download]  42.0% of 3.20MiB at 1.1MiB/s"),
        Some(StatusTag::Downloading)
    );
    assert_eq!(classify_line("100%"), Some(StatusTag::Downloading));
    assert_eq!(
        classify_line("[download] Destination: song.webm"),
        Some(StatusTag::Downloading)
    );
}

#[test]
fn unrelated_lines_are_unclassified() {
    assert_eq!(classify_line("[youtube] abc: Downloading webpage"), None);
    assert_eq!(classify_line(""), None);
}
