use crash_log_context::{CrashContext, Registers, StackWindow, STACK_WORDS};

#[test]
fn general_purpose_order() {
    let regs = Registers {
        eip: 0x10,
        eax: 1,
        ebx: 2,
        ecx: 3,
        edx: 4,
        edi: 5,
        esi: 6,
        ebp: 7,
        esp: 0x20,
    };

    let names: Vec<_> = regs.general_purpose().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["eax", "ebx", "ecx", "edx", "edi", "esi", "ebp"]);

    let values: Vec<_> = regs.general_purpose().iter().map(|(_, v)| *v).collect();
    assert_eq!(values, [1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn stack_window_is_bounded() {
    let mut words = [0u32; STACK_WORDS];
    for (i, word) in words.iter_mut().enumerate() {
        *word = i as u32 * 4;
    }

    let window = StackWindow::new(words);
    assert_eq!(window.len(), STACK_WORDS);
    assert_eq!(window.iter().count(), STACK_WORDS);
    assert_eq!(window.get(0), Some(0));
    assert_eq!(window.get(STACK_WORDS - 1), Some((STACK_WORDS as u32 - 1) * 4));
    assert_eq!(window.get(STACK_WORDS), None);

    let ctx = CrashContext::new(Registers::default(), Some(window));
    assert_eq!(ctx.stack.unwrap().get(1), Some(4));
}

#[test]
fn partial_stack_window() {
    let mut words = [0xCCCC_CCCCu32; STACK_WORDS];
    words[0] = 1;
    words[1] = 2;

    let window = StackWindow::partial(words, 2);
    assert!(window.is_truncated());
    assert_eq!(window.len(), 2);
    assert_eq!(window.iter().collect::<Vec<_>>(), [1, 2]);
    // Words past the readable prefix are never handed out
    assert_eq!(window.get(2), None);

    assert!(!StackWindow::new(words).is_truncated());
    assert_eq!(StackWindow::partial(words, STACK_WORDS + 5).len(), STACK_WORDS);
    assert!(StackWindow::partial(words, 0).is_empty());
}
