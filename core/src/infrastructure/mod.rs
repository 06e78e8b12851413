pub mod clock;
pub mod dataset;
pub mod llm;
pub mod ocr;
pub mod storage;
