use evalboard::grid::Grid;
use evalboard::sales::{extract_overall_ranking, extract_region_sections};

fn tokyo_sheet() -> Grid {
    Grid::from_text_rows(&[
        &["【チーム別サマリー】"],
        &[
            "順位",
            "チーム",
            "売上高",
            "支払高",
            "粗利益",
            "粗利益率",
            "売上比率",
            "粗利比率",
        ],
        &[
            "1",
            "制作1チーム",
            "¥1,200,000",
            "¥300,000",
            "¥900,000",
            "75.0%",
            "48.0%",
            "52.9%",
        ],
        &[
            "2",
            "制作2チーム",
            "¥1,300,000",
            "¥500,000",
            "¥800,000",
            "61.5%",
            "52.0%",
            "47.1%",
        ],
        &["", "合計", "¥2,500,000", "¥800,000", "¥1,700,000", "", "", ""],
        &[""],
        &["【東京 制作1部個人ランキング】"],
        &[
            "順位",
            "氏名",
            "所属チーム",
            "売上額",
            "部内売上比率",
            "粗利額",
            "部内粗利比率",
            "粗利益率",
        ],
        &[
            "1",
            "山田 太郎",
            "制作1チーム",
            "¥400,000",
            "33.3%",
            "¥200,000",
            "22.2%",
            "50.0%",
        ],
        &[
            "2",
            "佐藤 花子",
            "制作1チーム",
            "¥800,000",
            "66.7%",
            "¥700,000",
            "77.8%",
            "87.5%",
        ],
        &[""],
        &["【東京 制作2部個人ランキング】"],
        &[
            "順位",
            "氏名",
            "所属チーム",
            "売上額",
            "部内売上比率",
            "粗利額",
            "部内粗利比率",
            "粗利益率",
        ],
        &[
            "1",
            "高橋 次郎",
            "制作2チーム",
            "¥1,300,000",
            "100.0%",
            "¥800,000",
            "100.0%",
            "61.5%",
        ],
    ])
}

#[test]
fn region_sheet_yields_rollup_and_per_department_rankings() {
    let view = extract_region_sections(&tokyo_sheet(), "東京");

    assert_eq!(view.team_summary.len(), 2, "total row must not survive");
    assert_eq!(view.team_summary[0].team, "制作1チーム");
    assert_eq!(view.team_summary[0].sales, 1_200_000.0);
    assert_eq!(view.team_summary[0].expense, 300_000.0);
    assert_eq!(view.team_summary[1].profit_rate, 61.5);

    let names: Vec<&str> = view
        .departments
        .iter()
        .map(|department| department.name.as_str())
        .collect();
    assert_eq!(names, ["制作1部", "制作2部"]);
}

#[test]
fn department_ranks_ignore_source_numbering() {
    let view = extract_region_sections(&tokyo_sheet(), "東京");
    let first = view
        .departments
        .iter()
        .find(|department| department.name == "制作1部")
        .expect("制作1部 present");

    // 佐藤 out-sells 山田, so she takes rank 1 regardless of sheet order.
    assert_eq!(first.entries[0].name, "佐藤 花子");
    assert_eq!(first.entries[0].rank, 1);
    assert_eq!(first.entries[1].name, "山田 太郎");
    assert_eq!(first.entries[1].rank, 2);
}

#[test]
fn repeated_extraction_is_stable() {
    let grid = tokyo_sheet();
    let first = extract_region_sections(&grid, "東京");
    let second = extract_region_sections(&grid, "東京");
    assert_eq!(first, second);
}

#[test]
fn overall_sheet_concatenates_segments_and_skips_header_echoes() {
    let grid = Grid::from_text_rows(&[
        &[
            "順位",
            "氏名",
            "所属チーム",
            "売上額",
            "売上比率",
            "粗利額",
            "粗利比率",
            "粗利益率",
        ],
        &[
            "1",
            "山田 太郎",
            "制作1チーム",
            "¥400,000",
            "30.8%",
            "¥200,000",
            "20.0%",
            "50.0%",
        ],
        // Pagination artifact: the sheet repeats its header mid-list.
        &[
            "順位",
            "氏名",
            "所属チーム",
            "売上額",
            "売上比率",
            "粗利額",
            "粗利比率",
            "粗利益率",
        ],
        &[
            "2",
            "佐藤 花子",
            "制作2チーム",
            "¥300,000",
            "23.1%",
            "¥150,000",
            "15.0%",
            "50.0%",
        ],
        &["", "-", "", "", "", "", "", ""],
    ]);

    let entries = extract_overall_ranking(&grid);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "山田 太郎");
    assert_eq!(entries[0].sales_share, 30.8);
    assert_eq!(entries[1].name, "佐藤 花子");
    assert_eq!(entries[1].rank, 2);
}

#[test]
fn csv_export_parses_like_inline_rows() {
    let csv = "\
【チーム別サマリー】,,,,,,,\n\
順位,チーム,売上高,支払高,粗利益,粗利益率,売上比率,粗利比率\n\
1,制作1チーム,¥500,¥100,¥400,80.0%,100.0%,100.0%\n";
    let grid = Grid::from_csv_reader(csv.as_bytes()).expect("csv parses");
    let view = extract_region_sections(&grid, "東京");
    assert_eq!(view.team_summary.len(), 1);
    assert_eq!(view.team_summary[0].profit, 400.0);
}
