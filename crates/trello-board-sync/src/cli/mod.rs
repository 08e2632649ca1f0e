/*
[INPUT]:  Subcommands that need interactive input
[OUTPUT]: CLI helper modules for the runner binary
[POS]:    CLI layer - module wiring
[UPDATE]: When adding interactive flows
*/

pub mod init;
