// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

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
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn record_fields(cmd: Command) -> Command {
    cmd.arg(req("name", "What the charge is for"))
        .arg(req("amount", "Amount per period, non-negative"))
        .arg(req("frequency", "one_time | monthly | annual"))
        .arg(opt("currency", "CHF | EUR | USD (default: base currency)"))
        .arg(opt("status", "paid | pending | upcoming (default: pending)"))
        .arg(opt("category", "Free-form category"))
        .arg(opt("start", "First day the charge applies (YYYY-MM-DD)"))
        .arg(opt("end", "Last day the charge applies (YYYY-MM-DD)"))
        .arg(opt("payment-date", "Date paid or due (YYYY-MM-DD)"))
        .arg(opt("renewal", "Next renewal date (YYYY-MM-DD)"))
        .arg(opt("notes", "Notes"))
}

fn record_filters(cmd: Command) -> Command {
    json_flags(
        cmd.arg(opt("status", "Filter by status"))
            .arg(opt("frequency", "Filter by frequency"))
            .arg(opt("currency", "Filter by currency"))
            .arg(opt("category", "Filter by category"))
            .arg(opt("search", "Substring over name and notes"))
            .arg(opt("active-on", "Only records active on this date"))
            .arg(opt("project", "Only records of this project"))
            .arg(
                Arg::new("general")
                    .long("general")
                    .action(ArgAction::SetTrue)
                    .help("Only records without a project"),
            ),
    )
}

fn id_arg() -> Arg {
    req("id", "Row id")
}

pub fn build_cli() -> Command {
    command!()
        .name("dealclip")
        .about("Small-business CRM: leads, activities, clients, projects and recurring bookkeeping")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Settings stored in the database")
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "base_currency | busy_timeout_ms | http_timeout_secs | user_id"))
                        .arg(req("value", "New value")),
                )
                .subcommand(Command::new("get").arg(req("key", "Setting name")))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("client")
                .about("Clients")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Client name"))
                        .arg(opt("company", "Company"))
                        .arg(opt("email", "Email"))
                        .arg(opt("phone", "Phone"))
                        .arg(opt("address", "Postal address"))
                        .arg(opt("notes", "Notes")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(opt("search", "Substring over name, company, email")),
                ))
                .subcommand(json_flags(
                    Command::new("show")
                        .arg(req("name", "Client name"))
                        .arg(opt("date", "Reference date (default today)"))
                        .arg(opt("currency", "Report totals in this currency")),
                ))
                .subcommand(Command::new("rm").arg(req("name", "Client name"))),
        )
        .subcommand(
            Command::new("lead")
                .about("Sales pipeline")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Lead name"))
                        .arg(opt("company", "Company"))
                        .arg(opt("email", "Email"))
                        .arg(opt("phone", "Phone"))
                        .arg(opt("source", "Where the lead came from"))
                        .arg(opt("value", "Estimated deal value"))
                        .arg(opt("currency", "Currency of the value"))
                        .arg(opt("follow-up", "Next follow-up date"))
                        .arg(opt("notes", "Notes")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("status", "Pipeline stage"))
                        .arg(opt("source", "Lead source"))
                        .arg(opt("search", "Substring over name, company, email"))
                        .arg(opt("match", "Regex over name, company, email"))
                        .arg(opt("follow-up-by", "Follow-up due on or before this date"))
                        .arg(
                            Arg::new("open")
                                .long("open")
                                .action(ArgAction::SetTrue)
                                .help("Hide won and lost leads"),
                        ),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(req("name", "Lead name"))
                        .arg(req("status", "new | contacted | qualified | proposal | negotiation | won | lost"))
                        .arg(opt("date", "Date of the change (default today)")),
                )
                .subcommand(
                    Command::new("log")
                        .arg(req("name", "Lead name"))
                        .arg(req("kind", "call | email | meeting | note"))
                        .arg(req("description", "What happened"))
                        .arg(opt("date", "Date of the contact (default today)")),
                )
                .subcommand(json_flags(
                    Command::new("history").arg(req("name", "Lead name")),
                ))
                .subcommand(Command::new("convert").arg(req("name", "Lead name")))
                .subcommand(Command::new("rm").arg(req("name", "Lead name"))),
        )
        .subcommand(
            Command::new("activity")
                .about("Scheduled calls, emails, meetings and tasks")
                .subcommand(
                    Command::new("add")
                        .arg(req("title", "Title"))
                        .arg(req("kind", "call | email | meeting | task | follow_up"))
                        .arg(req("date", "Scheduled date"))
                        .arg(opt("lead", "Linked lead name"))
                        .arg(opt("client", "Linked client name"))
                        .arg(opt("notes", "Notes")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("status", "Filter by status"))
                        .arg(opt("kind", "Filter by kind"))
                        .arg(opt("lead", "Linked lead name"))
                        .arg(opt("client", "Linked client name"))
                        .arg(opt("from", "Scheduled on or after"))
                        .arg(opt("to", "Scheduled on or before")),
                ))
                .subcommand(Command::new("complete").arg(id_arg()))
                .subcommand(Command::new("cancel").arg(id_arg()))
                .subcommand(
                    Command::new("reschedule")
                        .arg(id_arg())
                        .arg(req("date", "New date")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("project")
                .about("Client projects")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Project name"))
                        .arg(req("client", "Client name"))
                        .arg(opt("total", "Total amount"))
                        .arg(opt("currency", "Currency"))
                        .arg(opt("payment-type", "one_time | monthly | annual | milestone"))
                        .arg(opt("status", "planned | active | on_hold | completed | cancelled"))
                        .arg(opt("start", "Start date"))
                        .arg(opt("end", "End date")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("client", "Client name"))
                        .arg(opt("status", "Filter by status")),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(req("name", "Project name"))
                        .arg(opt("rename", "New name"))
                        .arg(opt("total", "Total amount"))
                        .arg(opt("currency", "Currency"))
                        .arg(opt("payment-type", "Payment type"))
                        .arg(opt("status", "Status"))
                        .arg(opt("start", "Start date"))
                        .arg(opt("end", "End date")),
                )
                .subcommand(
                    Command::new("status")
                        .arg(req("name", "Project name"))
                        .arg(req("status", "planned | active | on_hold | completed | cancelled")),
                )
                .subcommand(
                    Command::new("pay")
                        .arg(req("name", "Project name"))
                        .arg(req("amount", "Amount received")),
                )
                .subcommand(json_flags(
                    Command::new("show").arg(req("name", "Project name")),
                ))
                .subcommand(Command::new("rm").arg(req("name", "Project name"))),
        )
        .subcommand(
            Command::new("milestone")
                .about("Payment checkpoints of milestone projects")
                .subcommand(
                    Command::new("add")
                        .arg(req("project", "Project name"))
                        .arg(req("name", "Milestone name"))
                        .arg(req("amount", "Amount"))
                        .arg(opt("due", "Due date")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(opt("project", "Project name")),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(id_arg())
                        .arg(req("status", "pending | partial | paid"))
                        .arg(opt("paid-amount", "Amount received so far (partial)"))
                        .arg(opt("paid-date", "Date of payment (default today)")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("expense")
                .about("Company and client expenses")
                .subcommand(
                    record_fields(Command::new("add"))
                        .arg(opt("client", "Bill to this client instead of the company"))
                        .arg(opt("project", "Project of that client")),
                )
                .subcommand(record_filters(
                    Command::new("list").arg(opt("client", "Client expenses of this client")).arg(
                        Arg::new("clients")
                            .long("clients")
                            .action(ArgAction::SetTrue)
                            .help("List client expenses instead of company expenses"),
                    ),
                ))
                .subcommand(
                    Command::new("pay")
                        .arg(id_arg())
                        .arg(opt("date", "Payment date (default today)"))
                        .arg(
                            Arg::new("clients")
                                .long("clients")
                                .action(ArgAction::SetTrue)
                                .help("The id refers to a client expense"),
                        ),
                )
                .subcommand(
                    Command::new("rm").arg(id_arg()).arg(
                        Arg::new("clients")
                            .long("clients")
                            .action(ArgAction::SetTrue)
                            .help("The id refers to a client expense"),
                    ),
                ),
        )
        .subcommand(
            Command::new("income")
                .about("Client income")
                .subcommand(
                    record_fields(Command::new("add"))
                        .arg(req("client", "Client name"))
                        .arg(opt("project", "Project of that client")),
                )
                .subcommand(record_filters(
                    Command::new("list").arg(opt("client", "Client name")),
                ))
                .subcommand(
                    Command::new("pay")
                        .arg(id_arg())
                        .arg(opt("date", "Payment date (default today)")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("invoice")
                .about("Invoices")
                .subcommand(
                    Command::new("add")
                        .arg(req("client", "Client name"))
                        .arg(req("number", "Invoice number"))
                        .arg(req("amount", "Amount"))
                        .arg(opt("currency", "Currency"))
                        .arg(opt("project", "Project name"))
                        .arg(opt("issue", "Issue date (default today)"))
                        .arg(opt("due", "Due date")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("client", "Client name"))
                        .arg(opt("status", "Filter by status")),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(req("number", "Invoice number"))
                        .arg(req("status", "pending | paid | overdue | cancelled")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Recurring totals and dashboards")
                .subcommand(json_flags(
                    Command::new("recurring")
                        .arg(opt("scope", "company | client-expenses | income (default company)"))
                        .arg(opt("client", "Restrict to one client"))
                        .arg(opt("date", "Reference date (default today)"))
                        .arg(opt("currency", "Report totals in this currency")),
                ))
                .subcommand(json_flags(
                    Command::new("dashboard")
                        .arg(opt("date", "Reference date (default today)"))
                        .arg(opt("currency", "Report totals in this currency")),
                ))
                .subcommand(json_flags(Command::new("pipeline"))),
        )
        .subcommand(
            Command::new("fx")
                .about("Currency rates")
                .subcommand(Command::new("set-base").arg(req("currency", "CHF | EUR | USD")))
                .subcommand(
                    Command::new("rate")
                        .arg(req("date", "Rate date"))
                        .arg(req("base", "Base currency"))
                        .arg(req("quote", "Quote currency"))
                        .arg(req("rate", "1 base = RATE quote")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("currency", "Only pairs involving this currency"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Most recent rows to show (default 50)"),
                        ),
                ))
                .subcommand(
                    Command::new("convert")
                        .arg(req("date", "Conversion date"))
                        .arg(req("amount", "Amount"))
                        .arg(req("from", "From currency"))
                        .arg(req("to", "To currency")),
                )
                .subcommand(
                    Command::new("fetch").arg(
                        Arg::new("days")
                            .long("days")
                            .value_parser(value_parser!(usize))
                            .help("How many days back to fetch (default 120)"),
                    ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write records to CSV or JSON")
                .subcommand(
                    Command::new("records")
                        .arg(req("kind", "company-expenses | client-expenses | income | leads"))
                        .arg(req("format", "csv | json"))
                        .arg(req("out", "Output file")),
                ),
        )
        .subcommand(
            Command::new("attach")
                .about("Files attached to records")
                .subcommand(
                    Command::new("add")
                        .arg(req("entity", "company_expense | client_expense | client_income | invoice | project | client | lead"))
                        .arg(id_arg())
                        .arg(req("file", "File to upload")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("entity", "Record type"))
                        .arg(opt("id", "Record id")),
                ))
                .subcommand(Command::new("url").arg(id_arg())),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
