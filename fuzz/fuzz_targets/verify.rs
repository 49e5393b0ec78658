#![no_main]

use libfuzzer_sys::fuzz_target;
use rvcheck_core::lines::{split_lines, split_text_lines};
use rvcheck_core::{ProcessResult, Verdict, verify_golden};

fuzz_target!(|data: &[u8]| {
    // First byte picks the split point between captured output and reference text
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = (split as usize).min(rest.len());
    let (stdout, reference) = rest.split_at(at);

    let _ = split_lines(stdout);

    let Ok(reference) = std::str::from_utf8(reference) else {
        return;
    };
    // Same splitting rules as `read_reference`
    let reference: Vec<String> = split_text_lines(reference).into_iter().map(|l| l.trim().to_string()).collect();
    let result = ProcessResult::Completed {
        stdout: stdout.to_vec(),
    };

    let verdict = verify_golden(&result, &reference);
    assert_eq!(verdict, verify_golden(&result, &reference));

    // A run that reproduces the reference exactly always passes. A trailing empty reference line cannot be
    // echoed: the final terminator adds no line.
    let echoable = reference.last().is_none_or(|l| !l.is_empty());
    let echoed = ProcessResult::Completed {
        stdout: reference.join("\n").into_bytes(),
    };
    if echoable {
        assert_eq!(verify_golden(&echoed, &reference), Verdict::Pass);
    }
});
