#![no_main]

use std::time::Duration;

use libfuzzer_sys::arbitrary;
use libfuzzer_sys::fuzz_target;
use refine_diff::sources::lines;
use refine_diff::{diff_text, DiffOptions};

#[derive(arbitrary::Arbitrary, Debug)]
struct Input<'a> {
    before: &'a str,
    after: &'a str,
    ignore_trim_whitespace: bool,
    compute_moves: bool,
}

fn do_fuzz(input: Input<'_>) {
    let options = DiffOptions {
        ignore_trim_whitespace: input.ignore_trim_whitespace,
        max_computation_time: Duration::from_millis(100),
        compute_moves: input.compute_moves,
    };
    let diff = diff_text(input.before, input.after, &options);

    let before: Vec<&str> = lines(input.before).collect();
    let after: Vec<&str> = lines(input.after).collect();
    if let Err(err) = diff.validate(&before, &after) {
        panic!("invalid diff: {err}\n{diff:#?}");
    }
    if input.before == input.after {
        assert!(diff.changes.is_empty());
    }
}

fuzz_target!(|input: Input<'_>| {
    do_fuzz(input);
});
