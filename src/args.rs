use clap::Parser;

/// This program writes the per-subject feedback reports of a survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON description of the survey form: columns, options, rules and outputs.
    /// For more information about the file format, read the documentation of the survey_stats crate.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path, optional) A reference summary in JSON format. If provided, mashov checks that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of all the computed values will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the survey answers are read from this file. Setting this
    /// option overrides the path specified in the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path or empty) If specified, the report template. Setting this option overrides the
    /// path specified in the configuration.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
