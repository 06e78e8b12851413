pub mod analyze_text;
