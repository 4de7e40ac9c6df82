use criterion::{black_box, criterion_group, criterion_main, Criterion};

use studyhub_core::model::Question;
use studyhub_core::quiz::QuizEngine;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            q: format!("question {i}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer: i % 4,
            explain: "because".into(),
        })
        .collect()
}

fn bench_quiz_run(c: &mut Criterion) {
    let questions = make_questions(50);

    c.bench_function("quiz_full_run_50q", |b| {
        b.iter(|| {
            let mut engine = QuizEngine::new(black_box(questions.clone())).unwrap();
            while !engine.is_finished() {
                engine.select_option(0).unwrap();
                engine.advance().unwrap();
            }
            black_box(engine.is_finished())
        })
    });
}

criterion_group!(benches, bench_quiz_run);
criterion_main!(benches);
