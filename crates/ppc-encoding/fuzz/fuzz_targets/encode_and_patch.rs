#![no_main]

use libfuzzer_sys::fuzz_target;
use ppc_encoding::{Form, FormKind};
use ppc_patch::{apply_patch, Patch};

const KINDS: [FormKind; 5] = [
    FormKind::D,
    FormKind::X,
    FormKind::I,
    FormKind::B,
    FormKind::Xfx,
];

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let word = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let kind = KINDS[usize::from(data[4]) % KINDS.len()];
    let form = Form::extract(kind, word);
    let reencoded = form.encode().expect("extracted fields always fit");
    assert_eq!(reencoded.word(), word);
    assert_eq!(Form::extract(kind, reencoded.word()), form);

    let width = usize::from(data[5] % 8);
    let offset = usize::from(data[6]);
    let body = &data[7..];
    let before = body.iter().copied().take(width).collect::<Vec<_>>();
    let after = body.iter().rev().copied().take(width).collect::<Vec<_>>();

    let mut binary = body.to_vec();
    let patch = if data[5] & 0x80 == 0 {
        Patch::at(offset, before, after)
    } else {
        Patch::anywhere(before, after)
    };

    let original = binary.clone();
    match apply_patch(&patch, &mut binary) {
        Ok(_) => assert_eq!(binary.len(), original.len()),
        Err(_) => assert_eq!(binary, original),
    }
});
