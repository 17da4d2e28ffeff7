// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("smartbill")
        .about("AI-first personal finance tracking: talk to your ledger")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("chat")
                .about("Send text or a receipt image to the assistant")
                .arg(Arg::new("text").help("What to tell the assistant"))
                .arg(
                    Arg::new("image")
                        .long("image")
                        .value_name("FILE")
                        .help("Receipt image to analyze (jpg/png/webp)"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show the conversation transcript")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Show only the last N turns"),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage ledger entries")
                .subcommand(
                    Command::new("add")
                        .about("Record an entry manually")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("merchant").long("merchant"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(
                            Arg::new("income")
                                .long("income")
                                .action(ArgAction::SetTrue)
                                .help("Record as income"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List entries")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("pending")
                                .long("pending")
                                .action(ArgAction::SetTrue)
                                .help("Only the confirmation queue"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("confirm")
                        .about("Confirm a pending entry")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("delete").about("Delete an entry").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budget")
                .subcommand(
                    Command::new("set")
                        .about("Set the monthly budget")
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("show").about("Budget usage for the current month"),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Month aggregates and category breakdown")
                        .arg(Arg::new("date").long("date").help("As-of date, YYYY-MM-DD")),
                ))
                .subcommand(
                    Command::new("context")
                        .about("The grounding text exactly as the model sees it")
                        .arg(Arg::new("date").long("date").help("As-of date, YYYY-MM-DD")),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Assistant configuration")
                .subcommand(
                    Command::new("set-key")
                        .about("Store the model API key")
                        .arg(Arg::new("key").required(true)),
                )
                .subcommand(
                    Command::new("set-model")
                        .about("Override the model name")
                        .arg(Arg::new("model").required(true)),
                )
                .subcommand(
                    Command::new("set-base-url")
                        .about("Override the API base URL")
                        .arg(Arg::new("url").required(true)),
                )
                .subcommand(Command::new("show").about("Show configuration (key masked)")),
        )
        .subcommand(
            Command::new("import")
                .about("Import external records into the confirmation queue")
                .subcommand(
                    Command::new("csv")
                        .about("Import a CSV of date,amount,merchant,category")
                        .arg(Arg::new("file").required(true))
                        .arg(
                            Arg::new("trusted")
                                .long("trusted")
                                .action(ArgAction::SetTrue)
                                .help("Skip the confirmation queue"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Dump the full ledger")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("json")
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check configuration and data health"))
}
