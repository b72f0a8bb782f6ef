mod args;

pub use args::{
    AutoArgs, CellCountArgs, CellSizeArgs, CliArgs, Command, CommonArgs, GridArgs, MarginArg,
    PairArg, SizeArg,
};
