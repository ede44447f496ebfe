//! 農曆換算，資料涵蓋農曆 2000 年至 2049 年。
//!
//! 每年一個壓縮值：bit 16 為閏月大小（1 = 30 日），bit 15..=4 依序為正月至
//! 十二月的大小，bit 3..=0 為閏月月份（0 = 無閏月）。

use crate::domain::model::LunarDate;
use crate::domain::ports::LunarOracle;
use chrono::NaiveDate;

const FIRST_YEAR: i32 = 2000;

#[rustfmt::skip]
const YEAR_INFO: [u32; 50] = [
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
];

fn epoch() -> Option<NaiveDate> {
    // 農曆 2000 年正月初一
    NaiveDate::from_ymd_opt(2000, 2, 5)
}

fn leap_month(info: u32) -> u8 {
    (info & 0xf) as u8
}

fn leap_days(info: u32) -> i64 {
    match leap_month(info) {
        0 => 0,
        _ if info & 0x10000 != 0 => 30,
        _ => 29,
    }
}

fn month_days(info: u32, month: u8) -> i64 {
    if info & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(info: u32) -> i64 {
    (1..=12).map(|m| month_days(info, m)).sum::<i64>() + leap_days(info)
}

/// 內建表格的農曆換算
#[derive(Debug, Clone, Copy, Default)]
pub struct LunarTable;

impl LunarOracle for LunarTable {
    fn to_lunar(&self, date: NaiveDate) -> Option<LunarDate> {
        let mut offset = (date - epoch()?).num_days();
        if offset < 0 {
            return None;
        }

        for (index, &info) in YEAR_INFO.iter().enumerate() {
            let days = year_days(info);
            if offset >= days {
                offset -= days;
                continue;
            }

            let leap = leap_month(info);
            for month in 1..=12u8 {
                let regular = month_days(info, month);
                if offset < regular {
                    return Some(LunarDate {
                        year: FIRST_YEAR + index as i32,
                        month,
                        day: offset as u8 + 1,
                        leap: false,
                    });
                }
                offset -= regular;

                if month == leap {
                    let extra = leap_days(info);
                    if offset < extra {
                        return Some(LunarDate {
                            year: FIRST_YEAR + index as i32,
                            month,
                            day: offset as u8 + 1,
                            leap: true,
                        });
                    }
                    offset -= extra;
                }
            }
        }

        None
    }
}
