//! # Expense Categorizer Module
//!
//! Keyword-table lookup that assigns an expense to a category when none is
//! supplied. The table is ordered because keyword sets can overlap; the
//! first category whose keyword list substring-matches the description wins,
//! and "อื่นๆ" is the fallback.

use log::trace;

/// Fallback category when no keyword matches
pub const FALLBACK_CATEGORY: &str = "อื่นๆ";

/// Ordered {category -> keywords} table. Order is the tie-break for
/// overlapping keywords; do not sort.
static CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("ค่าแรง", &["ค่าแรง", "เงินเดือน", "โอที", "ลูกจ้าง", "พนักงาน"]),
    (
        "สาธารณูปโภค",
        &["ค่าไฟ", "ไฟฟ้า", "ค่าน้ำ", "น้ำประปา", "ประปา", "แก๊ส", "ก๊าซ"],
    ),
    ("ค่าขนส่ง", &["ขนส่ง", "ค่ารถ", "น้ำมันรถ", "ค่าส่ง", "แมสเซ็นเจอร์"]),
    ("วัตถุดิบ", &["วัตถุดิบ", "ของสด", "ตลาด", "เนื้อ", "ผัก", "ผลไม้"]),
    (
        "อุปกรณ์",
        &["อุปกรณ์", "จาน", "ชาม", "ช้อน", "แก้ว", "เครื่องครัว"],
    ),
    ("ค่าสื่อสาร", &["โทรศัพท์", "อินเทอร์เน็ต", "เน็ต", "มือถือ"]),
    ("ซ่อมบำรุง", &["ซ่อม", "บำรุง", "อะไหล่"]),
    ("การตลาด", &["โฆษณา", "การตลาด", "โปรโมชั่น", "ป้าย"]),
];

/// Assign a category to an expense description
///
/// Iterates the fixed ordered keyword table and returns the first category
/// with a case-insensitive substring match; falls back to "อื่นๆ".
pub fn categorize(description: &str) -> &'static str {
    let haystack = description.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        for keyword in *keywords {
            if haystack.contains(keyword) {
                trace!("Categorized '{description}' as '{category}' via '{keyword}'");
                return category;
            }
        }
    }
    FALLBACK_CATEGORY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_category() {
        // Electricity bill is a utility
        assert_eq!(categorize("ค่าไฟฟ้า"), "สาธารณูปโภค");
        assert_eq!(categorize("ค่าน้ำประปาเดือนนี้"), "สาธารณูปโภค");
        assert_eq!(categorize("เติมแก๊สหุงต้ม"), "สาธารณูปโภค");
    }

    #[test]
    fn test_labor_category() {
        assert_eq!(categorize("เงินเดือนพนักงาน"), "ค่าแรง");
        assert_eq!(categorize("โอทีวันเสาร์"), "ค่าแรง");
    }

    #[test]
    fn test_transport_category() {
        assert_eq!(categorize("ค่าส่งของ"), "ค่าขนส่ง");
        assert_eq!(categorize("น้ำมันรถกระบะ"), "ค่าขนส่ง");
    }

    #[test]
    fn test_communication_category() {
        assert_eq!(categorize("ค่าเน็ตร้าน"), "ค่าสื่อสาร");
        assert_eq!(categorize("ค่าโทรศัพท์"), "ค่าสื่อสาร");
    }

    #[test]
    fn test_maintenance_category() {
        assert_eq!(categorize("ซ่อมตู้เย็น"), "ซ่อมบำรุง");
    }

    #[test]
    fn test_fallback_category() {
        assert_eq!(categorize("ค่าเช่าตึก"), FALLBACK_CATEGORY);
        assert_eq!(categorize(""), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_table_order_is_tie_break() {
        // "เงินเดือนพนักงานซ่อมป้าย" hits labor, maintenance and marketing
        // keywords; labor wins because it comes first in the table
        assert_eq!(categorize("เงินเดือนพนักงานซ่อมป้าย"), "ค่าแรง");
    }
}
