use clap::ValueEnum;
use rebatch_core::CaseMode;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl From<OutputFormat> for rebatch_core::OutputFormat {
    fn from(arg: OutputFormat) -> Self {
        match arg {
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

impl From<rebatch_core::OutputFormat> for OutputFormat {
    fn from(format: rebatch_core::OutputFormat) -> Self {
        match format {
            rebatch_core::OutputFormat::Summary => Self::Summary,
            rebatch_core::OutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CaseArg {
    /// MY FILE NAME
    Upper,
    /// my file name
    Lower,
    /// My File Name (splits on `_`, `-` and spaces)
    Title,
    /// MyFileName (splits on `_`, `-` and spaces)
    Camel,
}

impl From<CaseArg> for CaseMode {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Upper => Self::Upper,
            CaseArg::Lower => Self::Lower,
            CaseArg::Title => Self::Title,
            CaseArg::Camel => Self::Camel,
        }
    }
}
