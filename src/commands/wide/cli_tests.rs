//! CLI parsing tests for wide command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "wide",
        test_name: test_wide_requires_value,
        required_arg: "<VALUE>",
    }

    crate::cli_option_test! {
        command: "wide",
        variant: Wide,
        test_name: test_wide_with_value,
        args: ["170141183460469231731687303715884105727"],
        field: value,
        expected: "170141183460469231731687303715884105727",
    }

    crate::cli_option_test! {
        command: "wide",
        variant: Wide,
        test_name: test_wide_with_negative_value,
        args: ["-1"],
        field: value,
        expected: "-1",
    }

    crate::cli_option_test! {
        command: "wide",
        variant: Wide,
        test_name: test_wide_with_unsigned,
        args: ["1", "--unsigned"],
        field: unsigned,
        expected: true,
    }

    crate::cli_defaults_test! {
        command: "wide",
        variant: Wide,
        required_args: ["1"],
        defaults: {
            unsigned: false,
        },
    }
}
